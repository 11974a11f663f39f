//! Filesystem reference store using the git lock-file protocol.
//!
//! A ref `refs/heads/main` lives at `<root>/refs/heads/main` and holds the
//! hex commit id followed by a newline. An update creates
//! `<root>/refs/heads/main.lock` exclusively, checks the current value while
//! holding it, writes the new value into the lock file and renames it over
//! the ref. The exclusive create is what makes CAS atomic across processes.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use folio_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;

const LOCK_SUFFIX: &str = ".lock";

/// A [`RefStore`] backed by one file per ref.
#[derive(Debug, Clone)]
pub struct FsRefStore {
    root: PathBuf,
}

/// Removes the lock file on drop unless it was renamed into place.
struct LockFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl FsRefStore {
    /// Open a ref store rooted at `root` (the directory containing `refs/`).
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("refs").join("heads"))?;
        Ok(Self { root })
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn lock_path(path: &Path) -> PathBuf {
        let mut s: OsString = path.as_os_str().to_owned();
        s.push(LOCK_SUFFIX);
        PathBuf::from(s)
    }

    fn parse(name: &str, contents: &str) -> Result<ObjectId> {
        ObjectId::from_hex(contents.trim()).map_err(|e| RefError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn collect(&self, dir: &Path, out: &mut Vec<(String, ObjectId)>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.collect(&path, out)?;
                continue;
            }
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if name.ends_with(LOCK_SUFFIX) {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            out.push((name.clone(), Self::parse(&name, &contents)?));
        }
        Ok(())
    }
}

impl RefStore for FsRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        validate_ref_name(name)?;
        match fs::read_to_string(self.ref_path(name)) {
            Ok(contents) => Self::parse(name, &contents).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn compare_and_swap_ref(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<bool> {
        validate_ref_name(name)?;
        let path = self.ref_path(name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let lock_path = Self::lock_path(&path);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(name, "ref locked by another writer");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let mut lock = LockFile {
            path: lock_path,
            committed: false,
        };

        let current = self.read_ref(name)?;
        if current != expected {
            debug!(name, ?expected, ?current, "ref CAS rejected");
            return Ok(false);
        }

        writeln!(file, "{}", new.to_hex())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&lock.path, &path)?;
        lock.committed = true;
        debug!(name, new = %new.short_hex(), "ref updated");
        Ok(true)
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>> {
        let mut refs = Vec::new();
        self.collect(&self.root.join("refs"), &mut refs)?;
        refs.retain(|(name, _)| name.starts_with(prefix));
        refs.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_hash([b; 32])
    }

    #[test]
    fn unborn_then_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRefStore::open(dir.path()).unwrap();
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), None);

        assert!(store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap());
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(oid(1)));

        let on_disk = fs::read_to_string(dir.path().join("refs/heads/main")).unwrap();
        assert_eq!(on_disk, format!("{}\n", oid(1).to_hex()));
    }

    #[test]
    fn stale_cas_leaves_ref_and_no_lock() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRefStore::open(dir.path()).unwrap();
        store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap();

        assert!(!store
            .compare_and_swap_ref("refs/heads/main", Some(oid(9)), oid(2))
            .unwrap());
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(oid(1)));
        assert!(!dir.path().join("refs/heads/main.lock").exists());
    }

    #[test]
    fn held_lock_fails_cas() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRefStore::open(dir.path()).unwrap();
        store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap();

        let lock = dir.path().join("refs/heads/main.lock");
        fs::write(&lock, b"").unwrap();
        assert!(!store
            .compare_and_swap_ref("refs/heads/main", Some(oid(1)), oid(2))
            .unwrap());
        // Someone else's lock is not ours to remove.
        assert!(lock.exists());

        fs::remove_file(&lock).unwrap();
        assert!(store
            .compare_and_swap_ref("refs/heads/main", Some(oid(1)), oid(2))
            .unwrap());
    }

    #[test]
    fn corrupt_ref_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRefStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("refs/heads/main"), b"not hex\n").unwrap();
        assert!(matches!(
            store.read_ref("refs/heads/main"),
            Err(RefError::Corrupt { .. })
        ));
    }

    #[test]
    fn list_nested_refs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRefStore::open(dir.path()).unwrap();
        store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap();
        store
            .compare_and_swap_ref("refs/heads/drafts/ann", None, oid(2))
            .unwrap();
        fs::write(dir.path().join("refs/heads/main.lock"), b"").unwrap();

        let names: Vec<String> = store
            .branches()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["refs/heads/drafts/ann", "refs/heads/main"]);
    }

    #[test]
    fn concurrent_cas_has_single_winner() {
        use std::sync::Arc;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsRefStore::open(dir.path()).unwrap());
        store.compare_and_swap_ref("refs/heads/main", None, oid(0)).unwrap();

        let handles: Vec<_> = (1..=6u8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .compare_and_swap_ref("refs/heads/main", Some(oid(0)), oid(i))
                        .unwrap()
                })
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
