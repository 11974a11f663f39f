use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use folio_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

type ObjectMap = HashMap<ObjectId, StoredObject>;

/// Object store held entirely in memory; used by tests and by
/// `Wiki::in_memory`. Objects are cloned in and out.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<ObjectMap>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Every stored id, sorted.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects().keys().copied().collect();
        ids.sort();
        ids
    }

    fn objects(&self) -> RwLockReadGuard<'_, ObjectMap> {
        self.objects.read().expect("object map lock poisoned")
    }

    fn objects_mut(&self) -> RwLockWriteGuard<'_, ObjectMap> {
        self.objects.write().expect("object map lock poisoned")
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects().get(id).cloned())
    }

    /// Idempotent: an id already present keeps its first copy.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        self.objects_mut().entry(id).or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.objects().contains_key(id))
    }
}

impl fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("objects", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::*;
    use folio_types::{Identity, Timestamp};

    fn make_blob(content: &[u8]) -> StoredObject {
        Blob::new(content).to_stored_object()
    }

    fn make_tree(blob: ObjectId) -> Tree {
        Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "index.mdown", blob),
            TreeEntry::new(EntryMode::Directory, "test", ObjectId::from_hash([9; 32])),
        ])
    }

    #[test]
    fn write_and_read_blob() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello world");
        let id = store.write(&obj).unwrap();
        assert!(!id.is_null());

        let read_back = store.read(&id).unwrap().expect("should exist");
        assert_eq!(read_back, obj);
    }

    #[test]
    fn typed_helpers_roundtrip_tree_and_commit() {
        let store = InMemoryObjectStore::new();
        let blob_id = store.put_blob(&Blob::new("# Example\n")).unwrap();
        let tree_id = store.put_tree(&make_tree(blob_id)).unwrap();

        let tree = store.get_tree(&tree_id).unwrap();
        assert_eq!(tree.get("index.mdown").unwrap().id, blob_id);

        let commit = Commit {
            tree: tree_id,
            parents: vec![],
            author: Identity::new("Ann <ann@example.com>").unwrap(),
            committer: Identity::new("Ann <ann@example.com>").unwrap(),
            timestamp: Timestamp::new(1000, 0).unwrap(),
            encoding: "utf-8".into(),
            message: "Initial Commit".into(),
        };
        let commit_id = store.put_commit(&commit).unwrap();
        assert_eq!(store.get_commit(&commit_id).unwrap(), commit);
        assert!(matches!(
            store.get_object(&commit_id).unwrap(),
            Object::Commit(_)
        ));
    }

    #[test]
    fn typed_get_of_wrong_kind_fails() {
        let store = InMemoryObjectStore::new();
        let blob_id = store.put_blob(&Blob::new("x")).unwrap();
        assert!(matches!(
            store.get_tree(&blob_id),
            Err(StoreError::UnexpectedKind { .. })
        ));
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::from_hash([3; 32]);
        assert!(store.read(&id).unwrap().is_none());
        assert!(!store.exists(&id).unwrap());
        assert!(matches!(store.get_blob(&id), Err(StoreError::NotFound(x)) if x == id));
    }

    #[test]
    fn same_content_produces_same_id() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(&make_blob(b"identical content")).unwrap();
        let id2 = store.write(&make_blob(b"identical content")).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_produces_different_ids() {
        let store = InMemoryObjectStore::new();
        let id1 = store.write(&make_blob(b"aaa")).unwrap();
        let id2 = store.write(&make_blob(b"bbb")).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn all_ids_sorted() {
        let store = InMemoryObjectStore::new();
        assert!(store.is_empty());
        store.write(&make_blob(b"12345")).unwrap();
        store.write(&make_blob(b"123456789")).unwrap();

        let ids = store.all_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] <= ids[1]);
    }

    #[test]
    fn concurrent_writes_dedup() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.write(&make_blob(b"shared data")).unwrap())
            })
            .collect();

        let ids: Vec<ObjectId> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.write(&make_blob(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("object_count"));
    }
}
