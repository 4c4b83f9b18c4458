//! Login session of the local player.
//!
//! Persisting the session across restarts is left to the embedding application, which restores
//! it through [`AuthService::with_authentication`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;
use validator::Validate;

use crate::{dto::login::LoginRequest, error::ServiceError, remote::RemoteGameService};

/// Who the client is playing as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    pub authenticated: bool,
    pub username: String,
}

/// Logs the player in and keeps the resulting [`Authentication`] observable.
pub struct AuthService {
    remote: Arc<dyn RemoteGameService>,
    authentication: watch::Sender<Authentication>,
}

impl AuthService {
    pub fn new(remote: Arc<dyn RemoteGameService>) -> Self {
        let (authentication, _rx) = watch::channel(Authentication::default());
        Self {
            remote,
            authentication,
        }
    }

    /// Start from an authentication the embedding application persisted earlier.
    ///
    /// The server-side session is not re-validated; a rejected call surfaces on the next request.
    pub fn with_authentication(self, authentication: Authentication) -> Self {
        self.authentication.send_replace(authentication);
        self
    }

    /// Log in as `username`, returning the server acknowledgement.
    ///
    /// The authentication is only recorded once the server accepted the login.
    pub async fn login(&self, username: &str) -> Result<String, ServiceError> {
        let request = LoginRequest {
            username: username.trim().to_string(),
        };
        request.validate()?;

        let username = request.username.clone();
        let response = self.remote.login(request).await?;
        info!(%username, message = %response.message, "logged in");

        self.authentication.send_replace(Authentication {
            authenticated: true,
            username,
        });
        Ok(response.message)
    }

    /// Forget the current authentication.
    pub fn logout(&self) {
        let previous = self.authentication.send_replace(Authentication::default());
        if previous.authenticated {
            info!(username = %previous.username, "logged out");
        }
    }

    pub fn current(&self) -> Authentication {
        self.authentication.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Authentication> {
        self.authentication.subscribe()
    }
}
