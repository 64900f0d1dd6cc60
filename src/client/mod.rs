//! Session Client
//!
//! Front-end side of the authentication flow: an HTTP client for the
//! session API, persisted token storage, the session state machine and the
//! route guard that reads it.

pub mod api;
pub mod context;
pub mod guard;
pub mod storage;

pub use api::{SessionApi, SessionClient};
pub use context::{SessionContext, SessionState};
pub use guard::{route_guard, GuardDecision, LOGIN_PATH};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage, TOKEN_KEY};

/// Errors surfaced to the user interface
///
/// Anything that is not a recognised API rejection (transport failure,
/// unparsable body, unexpected status) is reported as `Unexpected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Session API request failed: {}", err);
        ClientError::Unexpected(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        tracing::warn!("Token storage failed: {}", err);
        ClientError::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Unexpected(err.to_string())
    }
}
