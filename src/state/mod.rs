pub mod game;
pub mod transitions;

use std::{sync::Arc, time::SystemTime};

use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use crate::{
    remote::RemoteError,
    state::game::{GameSnapshot, PreviousMovieReveal, Scoreboard, UnknownPhase},
};

pub type SharedState = Arc<GameState>;

/// Identifier of one `start()`..`stop()` span of the synchronization loop.
pub type SessionId = Uuid;

/// Local view of the remote game, as published to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameView {
    /// Latest phase snapshot received from the server.
    pub current_snapshot: Option<GameSnapshot>,
    /// Reveal of the movie that was just played; only set around pauses.
    pub previous_movie: Option<PreviousMovieReveal>,
    /// Standings, empty until the first successful fetch.
    pub scoreboard: Scoreboard,
    /// True while a refresh timer is armed.
    pub refresh_armed: bool,
    pub status: SyncStatus,
    /// Most recent failure of the loop; cleared by the next fully successful cycle.
    pub last_failure: Option<SyncFailure>,
}

/// Lifecycle of the synchronization loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// Not started, or stopped.
    #[default]
    Idle,
    /// Polling the server.
    Running,
    /// Polling stopped because the server reported an unknown phase.
    Halted {
        /// Raw phase value that halted the loop.
        phase: String,
    },
}

/// Category of a loop failure surfaced to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    MalformedResponse,
    UnknownPhase,
}

/// Failure recorded in the view instead of being thrown at observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub kind: FailureKind,
    pub message: String,
    pub occurred_at: SystemTime,
}

impl SyncFailure {
    fn now(kind: FailureKind, message: String) -> Self {
        Self {
            kind,
            message,
            occurred_at: SystemTime::now(),
        }
    }
}

impl From<&RemoteError> for SyncFailure {
    fn from(err: &RemoteError) -> Self {
        let kind = if err.is_malformed() {
            FailureKind::MalformedResponse
        } else {
            FailureKind::Transport
        };
        SyncFailure::now(kind, err.to_string())
    }
}

impl From<&UnknownPhase> for SyncFailure {
    fn from(err: &UnknownPhase) -> Self {
        SyncFailure::now(FailureKind::UnknownPhase, err.to_string())
    }
}

/// Errors that can occur when opening a new session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeginError {
    /// A session is already polling the server.
    #[error("synchronization already running (session {0})")]
    AlreadyRunning(SessionId),
}

/// Errors that can occur when committing into the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// No session is live; the loop was stopped.
    #[error("no synchronization session is live")]
    NoSession,
    /// A different session is live; the writer belongs to a stopped one.
    #[error("session {got} is no longer live (current: {expected})")]
    SessionMismatch {
        /// Session currently live.
        expected: SessionId,
        /// Session the writer belongs to.
        got: SessionId,
    },
}

/// Container owning the local view of the game.
///
/// Observers read or subscribe; only the synchronization services write, and every write is
/// tied to the session it was started in so results of a stopped session are discarded.
pub struct GameState {
    view: watch::Sender<GameView>,
    session: Mutex<Option<SessionId>>,
}

impl GameState {
    /// Construct an empty [`GameState`] wrapped in an [`Arc`] so it can be shared cheaply.
    pub fn new() -> SharedState {
        let (view, _rx) = watch::channel(GameView::default());
        Arc::new(Self {
            view,
            session: Mutex::new(None),
        })
    }

    /// Clone the current view.
    pub fn view(&self) -> GameView {
        self.view.borrow().clone()
    }

    /// Subscribe to view updates.
    pub fn subscribe(&self) -> watch::Receiver<GameView> {
        self.view.subscribe()
    }

    /// Subscribe to view updates as a stream, starting with the current view.
    pub fn updates(&self) -> WatchStream<GameView> {
        WatchStream::new(self.view.subscribe())
    }

    /// Session currently live, if any.
    pub async fn current_session(&self) -> Option<SessionId> {
        *self.session.lock().await
    }

    /// Open a new session. A halted session is replaced; a running one is an error.
    pub(crate) async fn begin(&self) -> Result<SessionId, BeginError> {
        let mut guard = self.session.lock().await;
        if let Some(current) = *guard {
            if self.view.borrow().status == SyncStatus::Running {
                return Err(BeginError::AlreadyRunning(current));
            }
        }

        let session = Uuid::new_v4();
        *guard = Some(session);
        self.view.send_replace(GameView {
            status: SyncStatus::Running,
            ..GameView::default()
        });
        Ok(session)
    }

    /// Close the live session, if any, and reset the view to its empty defaults.
    ///
    /// Returns the session that was closed.
    pub(crate) async fn end(&self) -> Option<SessionId> {
        let mut guard = self.session.lock().await;
        let closed = guard.take();
        self.view.send_replace(GameView::default());
        closed
    }

    /// Apply `update` to the view if `session` is still live, as a single notification.
    pub(crate) async fn commit<F>(&self, session: SessionId, update: F) -> Result<(), CommitError>
    where
        F: FnOnce(&mut GameView),
    {
        let guard = self.session.lock().await;
        match *guard {
            Some(current) if current == session => {
                self.view.send_modify(update);
                Ok(())
            }
            Some(current) => Err(CommitError::SessionMismatch {
                expected: current,
                got: session,
            }),
            None => Err(CommitError::NoSession),
        }
    }
}
