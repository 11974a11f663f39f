use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid identity {identity:?}: {reason}")]
    InvalidIdentity { identity: String, reason: String },

    #[error("timezone offset out of range: {0} minutes")]
    InvalidOffset(i32),
}
