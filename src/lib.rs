//! Client-side synchronization engine for the "guess the movie" quiz, exposing modules for the
//! binary and integration tests.

pub mod config;
pub mod dto;
pub mod error;
pub mod remote;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
