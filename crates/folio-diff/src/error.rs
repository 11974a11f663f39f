//! Error types for the diff crate.

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A tree could not be loaded (missing, wrong kind, or corrupt).
    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
