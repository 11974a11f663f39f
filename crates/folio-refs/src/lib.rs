//! Reference management for the Folio document store.
//!
//! A ref is a named, mutable pointer to a commit id (for example
//! `refs/heads/main`). Refs are the only mutable state in the object model,
//! and every update is a compare-and-swap against the value the writer last
//! observed. A ref that has never been written is *unborn* and reads as
//! `None`.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Ref/branch name validation
//! - [`memory`] -- In-memory [`InMemoryRefStore`]
//! - [`fs`] -- Lock-file based [`FsRefStore`]

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{RefError, Result};
pub use fs::FsRefStore;
pub use memory::InMemoryRefStore;
pub use names::{branch_ref, validate_branch_name, validate_ref_name};
pub use traits::RefStore;
