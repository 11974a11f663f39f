//! Diff engine for the Folio document store.
//!
//! - [`TreeDiff`] / [`TreeChange`] -- recursive comparison of two root trees,
//!   restricted to file entries; the basis of the touched-path sets the
//!   merge controller compares.
//! - [`PageDiff`] / [`DiffHunk`] / [`DiffLine`] -- line-level diff of two
//!   page revisions.

pub mod error;
pub mod page_diff;
pub mod tree_diff;

pub use error::{DiffError, DiffResult};
pub use page_diff::{diff_pages, DiffHunk, DiffLine, PageDiff};
pub use tree_diff::{diff_trees, first_overlap, paths_overlap, TreeChange, TreeDiff};
