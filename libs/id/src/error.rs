//! Error types for ID parsing and validation.

use thiserror::Error;

/// Maximum accepted length of an identifier.
pub const MAX_ID_LEN: usize = 255;

/// Errors that can occur when parsing or validating IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("{kind} ID cannot be empty")]
    Empty { kind: &'static str },

    /// The ID contains whitespace or a path separator.
    #[error("{kind} ID contains invalid character {found:?}")]
    InvalidCharacter { kind: &'static str, found: char },

    /// The ID is longer than [`MAX_ID_LEN`].
    #[error("{kind} ID is {len} characters long (max {max})", max = MAX_ID_LEN)]
    TooLong { kind: &'static str, len: usize },
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty { .. })
    }
}
