use folio_store::StoreError;

/// Errors from path resolution and tree rewriting.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// No page file, or a missing directory segment, at `path`.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// A segment that must be a directory is a file.
    #[error("path shadowed: {path} is a file, not a directory")]
    PathShadowed { path: String },

    #[error("invalid page path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TreeResult<T> = Result<T, TreeError>;
