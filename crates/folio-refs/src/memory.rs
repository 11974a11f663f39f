//! In-memory reference store for testing and embedding.

use std::collections::BTreeMap;
use std::sync::Mutex;

use folio_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;

/// An in-memory implementation of [`RefStore`].
///
/// All refs live in a map behind one `Mutex`; holding it across the
/// read-compare-write makes CAS atomic. Data is lost when the store is
/// dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: Mutex<BTreeMap<String, ObjectId>>,
}

impl InMemoryRefStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        let refs = self.refs.lock().map_err(|_| RefError::Poisoned)?;
        Ok(refs.get(name).copied())
    }

    fn compare_and_swap_ref(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<bool> {
        validate_ref_name(name)?;
        let mut refs = self.refs.lock().map_err(|_| RefError::Poisoned)?;
        let current = refs.get(name).copied();
        if current != expected {
            debug!(name, ?expected, ?current, "ref CAS rejected");
            return Ok(false);
        }
        refs.insert(name.to_string(), new);
        debug!(name, new = %new.short_hex(), "ref updated");
        Ok(true)
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>> {
        let refs = self.refs.lock().map_err(|_| RefError::Poisoned)?;
        Ok(refs
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), *v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_hash([b; 32])
    }

    #[test]
    fn unborn_ref_reads_none() {
        let store = InMemoryRefStore::new();
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), None);
    }

    #[test]
    fn create_from_unborn() {
        let store = InMemoryRefStore::new();
        assert!(store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap());
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(oid(1)));
    }

    #[test]
    fn cas_with_stale_expectation_fails() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap();
        store.compare_and_swap_ref("refs/heads/main", Some(oid(1)), oid(2)).unwrap();

        assert!(!store
            .compare_and_swap_ref("refs/heads/main", Some(oid(1)), oid(3))
            .unwrap());
        assert!(!store.compare_and_swap_ref("refs/heads/main", None, oid(3)).unwrap());
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(oid(2)));
    }

    #[test]
    fn rejects_invalid_name() {
        let store = InMemoryRefStore::new();
        let err = store.compare_and_swap_ref("main", None, oid(1)).unwrap_err();
        assert!(matches!(err, RefError::InvalidName { .. }));
    }

    #[test]
    fn list_refs_by_prefix() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap_ref("refs/heads/main", None, oid(1)).unwrap();
        store.compare_and_swap_ref("refs/heads/draft", None, oid(2)).unwrap();
        store.compare_and_swap_ref("refs/tags/v1", None, oid(3)).unwrap();

        let branches = store.branches().unwrap();
        assert_eq!(
            branches,
            vec![
                ("refs/heads/draft".to_string(), oid(2)),
                ("refs/heads/main".to_string(), oid(1)),
            ]
        );
        assert_eq!(store.list_refs("").unwrap().len(), 3);
    }

    #[test]
    fn concurrent_cas_has_single_winner() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryRefStore::new());
        store.compare_and_swap_ref("refs/heads/main", None, oid(0)).unwrap();

        let handles: Vec<_> = (1..=8u8)
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
