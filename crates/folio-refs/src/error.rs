//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The ref or branch name is invalid.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The stored ref value could not be parsed.
    #[error("corrupt ref {name}: {reason}")]
    Corrupt { name: String, reason: String },

    /// A lock guarding the ref table was poisoned by a panicking writer.
    #[error("ref table lock poisoned")]
    Poisoned,

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
