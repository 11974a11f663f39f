use folio_types::{Identity, ObjectId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw page content.
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot of a root tree with parent linkage.
    Commit,
}

impl ObjectKind {
    /// Domain tag mixed into the hash of every object of this kind.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Blob => "folio-blob-v1",
            Self::Tree => "folio-tree-v1",
            Self::Commit => "folio-commit-v1",
        }
    }

    /// Parse the name produced by `Display`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag + canonical bytes.
///
/// `StoredObject` is the unit of storage. Backends never interpret `data`;
/// the typed wrappers below encode and decode it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Size of `data` in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        ObjectId::digest(self.kind.domain(), &self.data)
    }

    fn expect_kind(&self, expected: ObjectKind) -> StoreResult<()> {
        if self.kind != expected {
            return Err(StoreError::UnexpectedKind {
                id: self.compute_id(),
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (analogous to git blob).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::digest(ObjectKind::Blob.domain(), &self.data)
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    /// Octal mode value (for display).
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            _ => None,
        }
    }

    /// Regular or executable file: the only modes a page can be stored as.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            id,
        }
    }
}

/// Directory listing object (analogous to git tree).
///
/// Entries are kept sorted by name and names are unique, so the same set of
/// entries always encodes to the same bytes. Trees are values: editing one
/// in memory and writing it produces a new object, the stored original is
/// untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from entries. A later entry replaces an earlier one with
    /// the same name.
    pub fn new(entries: impl IntoIterator<Item = TreeEntry>) -> Self {
        let mut tree = Self::empty();
        for entry in entries {
            tree.insert(entry);
        }
        tree
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace the entry with `entry.name`, returning the old one.
    pub fn insert(&mut self, entry: TreeEntry) -> Option<TreeEntry> {
        match self.position(&entry.name) {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            Err(i) => {
                self.entries.insert(i, entry);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        let i = self.position(name).ok()?;
        Some(self.entries.remove(i))
    }

    /// Exact lookup by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        let i = self.position(name).ok()?;
        Some(&self.entries[i])
    }

    /// Entries in stored order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    /// Decode, rejecting listings that are unsorted, have duplicate names
    /// or contain names no path segment could produce.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        let tree: Self = serde_json::from_slice(&obj.data)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let corrupt = |reason: String| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason,
        };
        for entry in &tree.entries {
            if entry.name.is_empty() || entry.name.contains(['/', '\0']) {
                return Err(corrupt(format!("invalid entry name {:?}", entry.name)));
            }
        }
        for pair in tree.entries.windows(2) {
            if pair[0].name >= pair[1].name {
                return Err(corrupt(format!(
                    "entries out of order at {:?}",
                    pair[1].name
                )));
            }
        }
        Ok(tree)
    }

    pub fn id(&self) -> StoreResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Immutable snapshot: a root tree plus zero or more parent commits.
///
/// One parent for a normal edit, two after an automatic merge, none for the
/// first commit of a branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: Identity,
    pub committer: Identity,
    pub timestamp: Timestamp,
    pub encoding: String,
    pub message: String,
}

impl Commit {
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The first line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A decoded object of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        match self {
            Self::Blob(b) => Ok(b.to_stored_object()),
            Self::Tree(t) => t.to_stored_object(),
            Self::Commit(c) => c.to_stored_object(),
        }
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        match obj.kind {
            ObjectKind::Blob => Blob::from_stored_object(obj).map(Self::Blob),
            ObjectKind::Tree => Tree::from_stored_object(obj).map(Self::Tree),
            ObjectKind::Commit => Commit::from_stored_object(obj).map(Self::Commit),
        }
    }
}
