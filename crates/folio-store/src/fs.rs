//! Loose-object store on the local filesystem.
//!
//! Layout mirrors git's loose objects: `<root>/objects/ab/cdef...` where
//! `abcdef...` is the hex object id. Each file holds a `"<kind> <len>\0"`
//! header followed by the object data.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use folio_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Filesystem-backed object store.
///
/// Writes go to a temporary file in the destination directory and are moved
/// into place with a no-clobber rename, so readers never observe a partial
/// object and concurrent writers of the same object both succeed.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    objects_dir: PathBuf,
}

impl FsObjectStore {
    /// Open (creating if needed) the object directory under `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let objects_dir = root.as_ref().join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self { objects_dir })
    }

    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        let (fanout, rest) = hex.split_at(2);
        self.objects_dir.join(fanout).join(rest)
    }

    fn encode(object: &StoredObject) -> Vec<u8> {
        let header = format!("{} {}\0", object.kind, object.data.len());
        let mut buf = Vec::with_capacity(header.len() + object.data.len());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(&object.data);
        buf
    }

    fn decode(id: &ObjectId, raw: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id: *id,
            reason: reason.to_string(),
        };
        let nul = raw
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| corrupt("missing header terminator"))?;
        let header =
            std::str::from_utf8(&raw[..nul]).map_err(|_| corrupt("header is not UTF-8"))?;
        let (kind, len) = header
            .split_once(' ')
            .ok_or_else(|| corrupt("malformed header"))?;
        let kind = ObjectKind::from_name(kind).ok_or_else(|| corrupt("unknown object kind"))?;
        let len: usize = len.parse().map_err(|_| corrupt("malformed length"))?;

        let data = &raw[nul + 1..];
        if data.len() != len {
            return Err(corrupt("length does not match header"));
        }
        Ok(StoredObject::new(kind, data.to_vec()))
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let raw = match fs::read(self.object_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = Self::decode(id, &raw)?;
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }

        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&Self::encode(object))?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                debug!(id = %id.short_hex(), kind = %object.kind, size = object.size(), "object written");
            }
            // Another writer stored the same content first.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.error.into()),
        }
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}
