use thiserror::Error;

/// Errors raised while parsing wire values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid microversion {0:?}: expected <major>.<minor>")]
    InvalidMicroversion(String),

    #[error("invalid API version header {0:?}")]
    InvalidVersionHeader(String),

    #[error("invalid server status {0:?}")]
    InvalidStatus(String),

    #[error("invalid boolean value {0:?}")]
    InvalidBool(String),

    #[error("invalid reset state {0:?}: must be 'active' or 'error'")]
    InvalidResetState(String),
}
