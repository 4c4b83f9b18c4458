use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    remote::RemoteError,
    state::{BeginError, CommitError, game::UnknownPhase},
};

/// Errors surfaced by the phase scheduler.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server reported a phase outside the known set; polling halted.
    #[error(transparent)]
    UnknownPhase(#[from] UnknownPhase),
    /// `start()` was called while the loop is already polling.
    #[error("synchronization already running")]
    AlreadyRunning,
    /// The session was stopped while the operation was in flight.
    #[error("synchronization session ended")]
    SessionEnded,
    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<BeginError> for SyncError {
    fn from(err: BeginError) -> Self {
        match err {
            BeginError::AlreadyRunning(_) => SyncError::AlreadyRunning,
        }
    }
}

impl From<CommitError> for SyncError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::NoSession | CommitError::SessionMismatch { .. } => SyncError::SessionEnded,
        }
    }
}

/// Errors returned by the user-facing services (answers, login).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the player.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The game service could not be reached or answered garbage.
    #[error("game service unavailable")]
    Remote(#[from] RemoteError),
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}
