//! The [`RefStore`] trait defining the reference storage interface.

use folio_types::ObjectId;

use crate::error::Result;

/// Storage backend for named refs.
///
/// Implementations must be thread-safe (`Send + Sync`) and make
/// [`compare_and_swap_ref`](RefStore::compare_and_swap_ref) atomic with
/// respect to every other writer of the same store, in-process or not.
/// Nothing above this trait takes locks; ref CAS is the only
/// synchronization point.
pub trait RefStore: Send + Sync {
    /// Read a ref by its canonical name (e.g. `refs/heads/main`).
    ///
    /// Returns `Ok(None)` if the ref is unborn.
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>>;

    /// Set `name` to `new` only if it currently equals `expected`
    /// (`None` = unborn).
    ///
    /// Returns `Ok(false)` when the current value differs, leaving the ref
    /// untouched.
    fn compare_and_swap_ref(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<bool>;

    /// List all refs whose canonical name starts with `prefix`, sorted by
    /// name.
    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>>;

    /// List all branch refs.
    fn branches(&self) -> Result<Vec<(String, ObjectId)>> {
        self.list_refs("refs/heads/")
    }
}
