//! High-level API for the Folio document store.
//!
//! A [`Wiki`] is a set of pages stored as files in a content-addressed
//! tree of trees, on one branch ref. Reading resolves a page path to its
//! file; saving writes a new blob, rewrites the trees above it, commits,
//! and moves the branch with compare-and-swap, merging into concurrent
//! edits of other pages automatically.
//!
//! ```
//! use folio_sdk::Wiki;
//!
//! let wiki = Wiki::in_memory().unwrap();
//! let mut page = wiki.create_page("docs/intro", "mdown", "Ann <ann@example.com>").unwrap();
//! page.set_content("Hello");
//! page.save("Ann <ann@example.com>", "").unwrap();
//!
//! assert_eq!(wiki.get_page("docs/intro").unwrap().content(), "Hello\n");
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod page;
pub mod wiki;

pub use config::{WikiConfig, CONFIG_FILE};
pub use error::{SdkError, SdkResult};
pub use format::{Markup, PageFormat, DEFAULT_FORMAT};
pub use page::Page;
pub use wiki::{LogEntry, PageEntry, Wiki};

// Re-export key types
pub use folio_diff::{DiffHunk, DiffLine, PageDiff};
pub use folio_merge::EditOutcome;
pub use folio_store::{Commit, EntryMode};
pub use folio_tree::PagePath;
pub use folio_types::{Identity, ObjectId, Timestamp};
