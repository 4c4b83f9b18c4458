//! Error types of the HTTP game service client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`HttpRemoteError`] failures.
pub type HttpResult<T> = Result<T, HttpRemoteError>;

/// Failures that can occur while talking to the game service over HTTP.
#[derive(Debug, Error)]
pub enum HttpRemoteError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to send request to `{path}`")]
    RequestSend {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status code.
    #[error("unexpected response status {status} for `{path}`")]
    RequestStatus {
        path: &'static str,
        status: StatusCode,
    },
    /// The response body could not be read.
    #[error("failed to read response body for `{path}`")]
    ReadBody {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The response body is not the expected JSON document.
    #[error("failed to decode response for `{path}`")]
    DecodeResponse {
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl HttpRemoteError {
    /// Endpoint path the failure relates to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            HttpRemoteError::ClientBuilder { .. } => "client",
            HttpRemoteError::RequestSend { path, .. }
            | HttpRemoteError::RequestStatus { path, .. }
            | HttpRemoteError::ReadBody { path, .. }
            | HttpRemoteError::DecodeResponse { path, .. } => path,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, HttpRemoteError::DecodeResponse { .. })
    }
}
