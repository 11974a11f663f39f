use folio_types::ObjectId;

/// Errors from commit writing and merge control.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The ref moved to a head that touches the same paths as this edit.
    /// `orphan` is the persisted candidate commit, reachable only by id.
    #[error(
        "manual merge required: commit {} conflicts with head {}",
        .orphan.short_hex(),
        .head.short_hex()
    )]
    ManualMergeRequired {
        orphan: ObjectId,
        base: Option<ObjectId>,
        head: ObjectId,
    },

    /// The CAS retry budget ran out while the ref kept moving.
    #[error("update contention: ref still moving after {attempts} attempts")]
    UpdateContention { attempts: usize },

    /// The ref became unborn while an edit was in flight.
    #[error("ref {name} was deleted during the update")]
    RefDeleted { name: String },

    /// A commit was about to reference an object the store does not hold.
    #[error("missing {what} {id}")]
    MissingObject { what: &'static str, id: ObjectId },

    #[error(transparent)]
    Tree(#[from] folio_tree::TreeError),

    #[error(transparent)]
    Diff(#[from] folio_diff::DiffError),

    #[error(transparent)]
    Store(#[from] folio_store::StoreError),

    #[error(transparent)]
    Ref(#[from] folio_refs::RefError),
}

pub type MergeResult<T> = Result<T, MergeError>;
