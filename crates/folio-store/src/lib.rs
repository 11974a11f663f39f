//! Content-addressed object storage for the Folio document store.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Pages, directories and history are stored as
//! immutable objects identified by their BLAKE3 hash (domain-separated by
//! object kind).
//!
//! # Object Types
//!
//! - [`Blob`] -- raw page content
//! - [`Tree`] -- directory listing mapping names to (mode, object id)
//! - [`Commit`] -- root tree snapshot with parents, author and message
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- loose objects on disk, written by atomic rename
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: re-putting identical content returns the same id
//!    and performs no duplicate write.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. Orphaned objects are harmless; nothing here ever deletes.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, Object, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
