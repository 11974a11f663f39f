//! Path resolution and tree rewriting.
//!
//! A page lives at `dir/.../name` and is stored as the file entry
//! `<name>.<format>` inside the tree reached by walking `dir/...` from the
//! root tree.
//!
//! - [`PagePath`] -- a validated slash-separated page path.
//! - [`resolve`] -- read-only lookup of a page's file entry and format.
//! - [`rewrite`] / [`put_file`] -- persist a new leaf tree and every
//!   ancestor above it, returning the new root tree id.

pub mod error;
pub mod path;
pub mod resolve;
pub mod rewrite;

pub use error::{TreeError, TreeResult};
pub use path::PagePath;
pub use resolve::{find_page_entry, resolve, walk, Resolved};
pub use rewrite::{put_file, rewrite};
