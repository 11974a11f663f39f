//! Commit writing and merge control for the Folio document store.
//!
//! Every page save goes through [`MergeController::commit_page_edit`]:
//!
//! 1. The edit is applied to the base commit's root tree and a candidate
//!    commit is written. The candidate is always persisted.
//! 2. The branch ref is compare-and-swapped from the base to the candidate
//!    (fast-forward).
//! 3. If the ref moved, the paths changed since the base are compared with
//!    the paths this edit changed. Disjoint sets are merged automatically by
//!    replaying the edit on the new head; overlapping sets surface as
//!    [`MergeError::ManualMergeRequired`] and the ref is left alone.
//!
//! CAS attempts are bounded; running out is [`MergeError::UpdateContention`].

pub mod commit;
pub mod controller;
pub mod edit;
pub mod error;

pub use commit::{write_commit, CommitInfo, DEFAULT_ENCODING};
pub use controller::{EditOutcome, EditState, MergeController, DEFAULT_MAX_ATTEMPTS};
pub use edit::PageEdit;
pub use error::{MergeError, MergeResult};
