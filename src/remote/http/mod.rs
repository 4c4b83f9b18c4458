mod client;
mod config;
mod error;

pub use client::HttpRemote;
pub use config::HttpRemoteConfig;
pub use error::{HttpRemoteError, HttpResult};

use super::RemoteError;

impl From<HttpRemoteError> for RemoteError {
    fn from(err: HttpRemoteError) -> Self {
        let endpoint = err.endpoint();
        if err.is_decode() {
            RemoteError::malformed(endpoint, err)
        } else {
            RemoteError::transport(endpoint, err)
        }
    }
}
