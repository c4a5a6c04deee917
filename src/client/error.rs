use thiserror::Error as ThisError;

/// Why a recognition request failed. Every variant is terminal for the
/// request that produced it; retrying is a new user action.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RequestError {
    /// The service answered with a non-success status.
    #[error("server rejected the request: {0}")]
    ServerRejected(String),

    /// The exchange never completed (timeout, refused connection, DNS failure).
    #[error("no response from server")]
    NoResponse,

    /// A success response arrived but its body is not a valid prediction.
    #[error("malformed response from server")]
    Malformed,
}

impl RequestError {
    /// The server-supplied message, when there is one.
    pub fn message(&self) -> Option<&str> {
        match self {
            RequestError::ServerRejected(msg) => Some(msg.as_str()),
            RequestError::NoResponse | RequestError::Malformed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("unsupported URL scheme in '{0}' (only http:// is supported)")]
    UnsupportedScheme(String),

    #[error("invalid service URL '{0}'")]
    InvalidUrl(String),
}
