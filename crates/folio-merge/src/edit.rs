use folio_store::{EntryMode, ObjectStore};
use folio_tree::{path::join_path, put_file, TreeResult};
use folio_types::ObjectId;

/// A single-file change: store `blob` as `file_name` in directory `dir`.
///
/// An edit is independent of the tree it was made against, so it can be
/// replayed onto a newer head when the ref moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageEdit {
    pub dir: Vec<String>,
    pub file_name: String,
    pub blob: ObjectId,
    pub mode: EntryMode,
}

impl PageEdit {
    pub fn new(dir: Vec<String>, file_name: impl Into<String>, blob: ObjectId) -> Self {
        Self {
            dir,
            file_name: file_name.into(),
            blob,
            mode: EntryMode::Regular,
        }
    }

    pub fn with_mode(mut self, mode: EntryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Slash path of the file this edit writes.
    pub fn path(&self) -> String {
        join_path(&self.dir, &self.file_name)
    }

    /// Apply to the root tree `root` (`None` for an unborn branch), returning
    /// the new root tree id.
    pub fn apply(&self, store: &dyn ObjectStore, root: Option<&ObjectId>) -> TreeResult<ObjectId> {
        put_file(store, root, &self.dir, &self.file_name, self.blob, self.mode)
    }
}
