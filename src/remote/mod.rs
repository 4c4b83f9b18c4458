//! Boundary with the remote game service.

mod error;
#[cfg(feature = "http-client")]
pub mod http;

pub use self::error::{RemoteError, RemoteResult};

use futures::future::BoxFuture;

use crate::dto::{
    answer::{AnswerRequest, AnswerResponse},
    login::{LoginRequest, LoginResponse},
    movie::PreviousMovieResponse,
    phase::PhaseResponse,
    players::PlayerResponse,
};

/// Abstraction over the server that owns the game.
///
/// Credential handling (cookies, sessions) belongs to the implementation.
pub trait RemoteGameService: Send + Sync {
    fn fetch_phase(&self) -> BoxFuture<'static, RemoteResult<PhaseResponse>>;
    /// Players in server order; callers sort them.
    fn fetch_players(&self) -> BoxFuture<'static, RemoteResult<Vec<PlayerResponse>>>;
    fn fetch_previous_movie(&self) -> BoxFuture<'static, RemoteResult<PreviousMovieResponse>>;
    fn submit_answer(&self, request: AnswerRequest)
    -> BoxFuture<'static, RemoteResult<AnswerResponse>>;
    fn login(&self, request: LoginRequest) -> BoxFuture<'static, RemoteResult<LoginResponse>>;
}
