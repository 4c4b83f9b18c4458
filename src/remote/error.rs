use std::error::Error;
use thiserror::Error;

/// Result alias for remote service calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error raised by remote service implementations regardless of the transport.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The call could not complete (network, timeout, unexpected status).
    #[error("transport failure on `{endpoint}`: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The call completed but the payload could not be decoded.
    #[error("malformed response from `{endpoint}`: {message}")]
    Malformed {
        endpoint: &'static str,
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl RemoteError {
    /// Construct a transport error from any backend failure.
    pub fn transport(endpoint: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        RemoteError::Transport {
            endpoint,
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    /// Construct a malformed-response error from any decoding failure.
    pub fn malformed(endpoint: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        RemoteError::Malformed {
            endpoint,
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            RemoteError::Transport { endpoint, .. } | RemoteError::Malformed { endpoint, .. } => {
                endpoint
            }
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RemoteError::Malformed { .. })
    }
}
