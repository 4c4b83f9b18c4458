//! Answer submission with an out-of-band scoreboard refresh.

use std::sync::Arc;

use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    dto::answer::AnswerRequest,
    error::ServiceError,
    remote::RemoteGameService,
    state::{SessionId, SharedState, transitions::fetch_scoreboard},
};

/// Server verdict for a submitted guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerVerdict {
    /// `ok`: the guess matched the current movie.
    Correct,
    /// `ko`: the guess did not match.
    Incorrect,
    /// Any other message sent by the server.
    Other(String),
}

impl AnswerVerdict {
    /// Message as sent by the server.
    pub fn message(&self) -> &str {
        match self {
            AnswerVerdict::Correct => "ok",
            AnswerVerdict::Incorrect => "ko",
            AnswerVerdict::Other(message) => message,
        }
    }
}

impl From<String> for AnswerVerdict {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ok" => AnswerVerdict::Correct,
            "ko" => AnswerVerdict::Incorrect,
            _ => AnswerVerdict::Other(value),
        }
    }
}

/// Submits guesses and refreshes the scoreboard once the server has scored them.
pub struct AnswerService {
    remote: Arc<dyn RemoteGameService>,
    state: SharedState,
}

impl AnswerService {
    pub fn new(remote: Arc<dyn RemoteGameService>, state: SharedState) -> Self {
        Self { remote, state }
    }

    /// Submit `title` as a guess for the current movie and return the server verdict.
    ///
    /// The scoreboard refresh that follows runs in the background and is committed into the
    /// session that was live when the guess was sent; it races with the polling loop and the
    /// last write wins.
    pub async fn guess(&self, title: &str) -> Result<AnswerVerdict, ServiceError> {
        let request = AnswerRequest {
            title: title.trim().to_string(),
        };
        request.validate()?;

        let session = self.state.current_session().await;
        let response = self.remote.submit_answer(request).await?;
        let verdict = AnswerVerdict::from(response.message);
        info!(verdict = verdict.message(), "answer submitted");

        match session {
            Some(session) => self.spawn_scoreboard_refresh(session),
            None => debug!("no synchronization session; skipping scoreboard refresh"),
        }

        Ok(verdict)
    }

    fn spawn_scoreboard_refresh(&self, session: SessionId) {
        let remote = Arc::clone(&self.remote);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let scoreboard = match fetch_scoreboard(remote.as_ref()).await {
                Ok(scoreboard) => scoreboard,
                Err(err) => {
                    warn!(%session, error = %err, "scoreboard refresh after answer failed");
                    return;
                }
            };

            if let Err(err) = state
                .commit(session, |view| view.scoreboard = scoreboard)
                .await
            {
                debug!(%session, error = %err, "scoreboard refresh discarded");
            }
        });
    }
}
