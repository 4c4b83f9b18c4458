//! Wire payloads exchanged with the remote game service.

pub mod answer;
pub mod login;
pub mod movie;
pub mod phase;
pub mod players;
pub mod validation;
