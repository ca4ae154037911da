use reqwest::{Method, StatusCode};
use thiserror::Error;

// Errors raised while talking to the TaskFlow API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{method} {path} could not reach the server: {source}")]
    Network {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} returned {status}: {message}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        message: String,
    },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session token cannot be sent as a header value")]
    InvalidToken,
}

/// How a failed call should be presented by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered 401; the session has already been torn down.
    Unauthorized,
    /// The server answered with any other non-2xx status, or an unreadable body.
    Rejected,
    /// The request never got a response.
    Unreachable,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                FailureKind::Unauthorized
            }
            ApiError::Network { .. } => FailureKind::Unreachable,
            ApiError::Status { .. } | ApiError::Decode(_) | ApiError::InvalidToken => {
                FailureKind::Rejected
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == FailureKind::Unauthorized
    }
}

// Auth failures are reported at "failed" granularity only
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials(#[source] ApiError),

    #[error("Failed to create an account")]
    RegistrationFailed(#[source] ApiError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Token storage failed: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}
