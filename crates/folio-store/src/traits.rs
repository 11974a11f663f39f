use folio_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, Object, StoredObject, Tree};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same data always produces the same ID.
/// - `write` is idempotent: re-writing identical content returns the same
///   ID and performs no duplicate write.
/// - Concurrent reads and writes are safe from any number of threads.
/// - The store never interprets object contents.
///
/// The typed `get_*`/`put_*` helpers are provided on top of the three
/// required methods and treat a missing object as [`StoreError::NotFound`].
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read an object, failing with `NotFound` if absent.
    fn read_required(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    fn get_object(&self, id: &ObjectId) -> StoreResult<Object> {
        Object::from_stored_object(&self.read_required(id)?)
    }

    fn get_blob(&self, id: &ObjectId) -> StoreResult<Blob> {
        Blob::from_stored_object(&self.read_required(id)?)
    }

    fn get_tree(&self, id: &ObjectId) -> StoreResult<Tree> {
        Tree::from_stored_object(&self.read_required(id)?)
    }

    fn get_commit(&self, id: &ObjectId) -> StoreResult<Commit> {
        Commit::from_stored_object(&self.read_required(id)?)
    }

    fn put_object(&self, object: &Object) -> StoreResult<ObjectId> {
        self.write(&object.to_stored_object()?)
    }

    fn put_blob(&self, blob: &Blob) -> StoreResult<ObjectId> {
        self.write(&blob.to_stored_object())
    }

    fn put_tree(&self, tree: &Tree) -> StoreResult<ObjectId> {
        self.write(&tree.to_stored_object()?)
    }

    fn put_commit(&self, commit: &Commit) -> StoreResult<ObjectId> {
        self.write(&commit.to_stored_object()?)
    }
}
