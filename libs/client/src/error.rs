//! Errors returned by [`ServersClient`](crate::ServersClient).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("not acceptable: {message}")]
    NotAcceptable { message: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("server fault ({status}): {message}")]
    ServerFault { status: u16, message: String },

    #[error("{operation} returned {status}, expected {expected}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        expected: u16,
        body: String,
    },

    #[error(
        "{operation} response does not match the {microversion} schema: {}",
        .errors.join("; ")
    )]
    InvalidResponse {
        operation: &'static str,
        microversion: String,
        errors: Vec<String>,
    },

    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        source: serde_json::Error,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("invalid response schema: {0}")]
    Schema(String),
}

impl ClientError {
    /// Maps an error status and its (fault) message to a variant.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => Self::BadRequest { message },
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            406 => Self::NotAcceptable { message },
            409 => Self::Conflict { message },
            _ => Self::ServerFault { status, message },
        }
    }

    /// HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::NotAcceptable { .. } => Some(406),
            Self::Conflict { .. } => Some(409),
            Self::ServerFault { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
