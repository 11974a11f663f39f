use folio_store::{Commit, ObjectStore};
use folio_types::{Identity, ObjectId, Timestamp};
use tracing::debug;

use crate::error::{MergeError, MergeResult};

/// Encoding tag written into commits by default.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Author, time and message for a commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitInfo {
    pub author: Identity,
    pub timestamp: Timestamp,
    pub message: String,
    pub encoding: String,
}

impl CommitInfo {
    pub fn new(author: Identity, timestamp: Timestamp) -> Self {
        Self {
            author,
            timestamp,
            message: String::new(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }
}

/// Build and persist a commit of `tree` with the given parents. Refs are
/// not touched.
///
/// The tree and every parent must already be in the store, which keeps the
/// write order blob, trees, commit, ref.
pub fn write_commit(
    store: &dyn ObjectStore,
    tree: ObjectId,
    parents: &[ObjectId],
    info: &CommitInfo,
) -> MergeResult<ObjectId> {
    if !store.exists(&tree)? {
        return Err(MergeError::MissingObject { what: "tree", id: tree });
    }
    for parent in parents {
        if !store.exists(parent)? {
            return Err(MergeError::MissingObject {
                what: "parent commit",
                id: *parent,
            });
        }
    }

    let commit = Commit {
        tree,
        parents: parents.to_vec(),
        author: info.author.clone(),
        committer: info.author.clone(),
        timestamp: info.timestamp,
        encoding: info.encoding.clone(),
        message: info.message.clone(),
    };
    let id = store.put_commit(&commit)?;
    debug!(
        commit = %id.short_hex(),
        tree = %tree.short_hex(),
        parents = parents.len(),
        "commit written"
    );
    Ok(id)
}
