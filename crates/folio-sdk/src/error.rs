use folio_diff::DiffError;
use folio_merge::MergeError;
use folio_refs::RefError;
use folio_store::StoreError;
use folio_tree::TreeError;
use folio_types::{ObjectId, TypeError};
use thiserror::Error;

/// Errors surfaced by the wiki API.
///
/// Lower-layer errors are mapped onto these variants explicitly, so the
/// outcomes a caller is expected to handle (`PageNotFound`, `PathShadowed`,
/// `PageExists`, `ManualMergeRequired`, `UpdateContention`) are always
/// top-level variants.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("path shadowed: {0} is a file, not a directory")]
    PathShadowed(String),

    #[error("page already exists: {0}")]
    PageExists(String),

    /// A concurrent save touched the same page. `orphan` holds this save's
    /// content and is reachable only by id.
    #[error("manual merge required: commit {orphan} conflicts with head {head}")]
    ManualMergeRequired {
        orphan: ObjectId,
        base: Option<ObjectId>,
        head: ObjectId,
    },

    /// The branch kept moving; the save may be retried as a whole.
    #[error("update contention after {0} attempts")]
    UpdateContention(usize),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid author: {0}")]
    InvalidAuthor(String),

    #[error("page {0} is not valid UTF-8")]
    InvalidContent(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] RefError),

    #[error("diff error: {0}")]
    Diff(DiffError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;

impl From<StoreError> for SdkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::ObjectNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<DiffError> for SdkError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::Store(store) => store.into(),
        }
    }
}

impl From<TreeError> for SdkError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound { path } => Self::PageNotFound(path),
            TreeError::PathShadowed { path } => Self::PathShadowed(path),
            TreeError::InvalidPath { path, reason } => Self::InvalidPath { path, reason },
            TreeError::Store(store) => store.into(),
        }
    }
}

impl From<MergeError> for SdkError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::ManualMergeRequired { orphan, base, head } => {
                Self::ManualMergeRequired { orphan, base, head }
            }
            MergeError::UpdateContention { attempts } => Self::UpdateContention(attempts),
            MergeError::RefDeleted { name } => Self::BranchNotFound(name),
            MergeError::MissingObject { id, .. } => Self::ObjectNotFound(id),
            MergeError::Tree(tree) => tree.into(),
            MergeError::Diff(diff) => diff.into(),
            MergeError::Store(store) => store.into(),
            MergeError::Ref(refs) => Self::Ref(refs),
        }
    }
}

impl From<TypeError> for SdkError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidIdentity { identity, reason } => {
                Self::InvalidAuthor(format!("{identity:?}: {reason}"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
