//! Optimistic concurrency control for page edits.

use std::collections::BTreeSet;
use std::sync::Arc;

use folio_diff::{diff_trees, first_overlap};
use folio_refs::{validate_ref_name, RefStore};
use folio_store::ObjectStore;
use folio_tree::TreeError;
use folio_types::ObjectId;
use tracing::{debug, info, warn};

use crate::commit::{write_commit, CommitInfo};
use crate::edit::PageEdit;
use crate::error::{MergeError, MergeResult};

/// Default bound on ref CAS attempts per edit.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// States of a single edit as it is pushed onto the ref.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditState {
    /// The ref is expected to equal the base: try a fast-forward.
    BaseIsHead,
    /// The ref moved, but nothing it changed touches this edit's paths.
    BaseBehindNoOverlap { head: ObjectId, head_tree: ObjectId },
    /// The ref moved and changed `theirs`, which overlaps `ours`.
    BaseBehindOverlap {
        head: ObjectId,
        ours: String,
        theirs: String,
    },
    Done { commit: ObjectId, merged: bool },
    ManualMergeRequired { head: ObjectId },
}

/// What a successful [`MergeController::commit_page_edit`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    /// The commit the ref now points at (the base, for a no-op).
    pub commit: ObjectId,
    /// The candidate commit written for this edit; `None` for a no-op.
    pub candidate: Option<ObjectId>,
    /// `true` when `commit` is a merge of a concurrent head and `candidate`.
    pub merged: bool,
}

impl EditOutcome {
    pub fn is_noop(&self) -> bool {
        self.candidate.is_none()
    }
}

/// Per-edit facts fixed before the first CAS.
struct Pending<'a> {
    edit: &'a PageEdit,
    base: Option<ObjectId>,
    base_tree: Option<ObjectId>,
    candidate: ObjectId,
    ours: BTreeSet<String>,
}

/// Pushes page edits onto one ref.
///
/// The controller holds no locks. Every decision is made against a value
/// read from the ref and committed with a compare-and-swap, so any number of
/// controllers (threads or processes) may share one store and ref table.
pub struct MergeController {
    store: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
    ref_name: String,
    max_attempts: usize,
}

impl MergeController {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefStore>,
        ref_name: impl Into<String>,
    ) -> MergeResult<Self> {
        let ref_name = ref_name.into();
        validate_ref_name(&ref_name)?;
        Ok(Self {
            store,
            refs,
            ref_name,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Bound the number of CAS attempts per edit (at least one).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The commit the ref currently points at, `None` if unborn.
    pub fn head(&self) -> MergeResult<Option<ObjectId>> {
        Ok(self.refs.read_ref(&self.ref_name)?)
    }

    /// Commit `edit` on top of `base` and move the ref to include it.
    ///
    /// Returns the base unchanged when the edit does not change the tree.
    /// Otherwise the candidate commit (parent `base`) is always written,
    /// then fast-forwarded or merged into a concurrent head. Overlapping
    /// concurrent changes fail with [`MergeError::ManualMergeRequired`] and
    /// leave the ref untouched.
    pub fn commit_page_edit(
        &self,
        base: Option<ObjectId>,
        edit: &PageEdit,
        info: &CommitInfo,
    ) -> MergeResult<EditOutcome> {
        let store = self.store.as_ref();
        let base_tree = match base {
            Some(id) => Some(store.get_commit(&id)?.tree),
            None => None,
        };
        let new_tree = edit.apply(store, base_tree.as_ref())?;

        if let (Some(base), Some(base_tree)) = (base, base_tree) {
            if base_tree == new_tree {
                debug!(path = %edit.path(), base = %base.short_hex(), "edit changes nothing");
                return Ok(EditOutcome {
                    commit: base,
                    candidate: None,
                    merged: false,
                });
            }
        }

        let parents: Vec<ObjectId> = base.into_iter().collect();
        let candidate = write_commit(store, new_tree, &parents, info)?;
        let ours = diff_trees(store, base_tree.as_ref(), Some(&new_tree))?.touched_paths();
        let pending = Pending {
            edit,
            base,
            base_tree,
            candidate,
            ours,
        };

        let mut state = EditState::BaseIsHead;
        let mut attempts = 0;
        loop {
            debug!(ref_name = %self.ref_name, ?state, attempts, "edit state");
            state = match state {
                EditState::BaseIsHead => {
                    attempts = self.next_attempt(attempts)?;
                    if self.cas(base, candidate)? {
                        info!(
                            path = %edit.path(),
                            commit = %candidate.short_hex(),
                            "fast-forward"
                        );
                        EditState::Done {
                            commit: candidate,
                            merged: false,
                        }
                    } else {
                        self.classify(&pending)?
                    }
                }
                EditState::BaseBehindNoOverlap { head, head_tree } => {
                    attempts = self.next_attempt(attempts)?;
                    self.merge_onto(&pending, head, head_tree, info)?
                }
                EditState::BaseBehindOverlap { head, ours, theirs } => {
                    warn!(
                        head = %head.short_hex(),
                        orphan = %candidate.short_hex(),
                        %ours,
                        %theirs,
                        "concurrent edit touches the same path"
                    );
                    EditState::ManualMergeRequired { head }
                }
                EditState::Done { commit, merged } => {
                    return Ok(EditOutcome {
                        commit,
                        candidate: Some(candidate),
                        merged,
                    })
                }
                EditState::ManualMergeRequired { head } => {
                    return Err(MergeError::ManualMergeRequired {
                        orphan: candidate,
                        base,
                        head,
                    })
                }
            };
        }
    }

    fn next_attempt(&self, attempts: usize) -> MergeResult<usize> {
        if attempts >= self.max_attempts {
            warn!(ref_name = %self.ref_name, attempts, "giving up on contended ref");
            return Err(MergeError::UpdateContention { attempts });
        }
        Ok(attempts + 1)
    }

    fn cas(&self, expected: Option<ObjectId>, new: ObjectId) -> MergeResult<bool> {
        let swapped = self
            .refs
            .compare_and_swap_ref(&self.ref_name, expected, new)?;
        if !swapped {
            debug!(
                ref_name = %self.ref_name,
                expected = ?expected.map(|id| id.short_hex()),
                "ref CAS lost"
            );
        }
        Ok(swapped)
    }

    /// Re-read the ref after a lost CAS and decide how to continue.
    fn classify(&self, pending: &Pending<'_>) -> MergeResult<EditState> {
        let head = self.head()?;
        // Lost without the ref moving (another writer held the lock).
        if head == pending.base {
            return Ok(EditState::BaseIsHead);
        }
        let Some(head) = head else {
            return Err(MergeError::RefDeleted {
                name: self.ref_name.clone(),
            });
        };

        let store = self.store.as_ref();
        let head_tree = store.get_commit(&head)?.tree;
        let theirs =
            diff_trees(store, pending.base_tree.as_ref(), Some(&head_tree))?.touched_paths();
        Ok(match first_overlap(&pending.ours, &theirs) {
            Some((ours, theirs)) => EditState::BaseBehindOverlap {
                head,
                ours: ours.to_string(),
                theirs: theirs.to_string(),
            },
            None => EditState::BaseBehindNoOverlap { head, head_tree },
        })
    }

    /// Replay the edit onto `head` and try to move the ref to a merge
    /// commit with parents `[head, candidate]`.
    fn merge_onto(
        &self,
        pending: &Pending<'_>,
        head: ObjectId,
        head_tree: ObjectId,
        info: &CommitInfo,
    ) -> MergeResult<EditState> {
        let store = self.store.as_ref();
        let merged_tree = match pending.edit.apply(store, Some(&head_tree)) {
            Ok(tree) => tree,
            Err(TreeError::PathShadowed { path }) => {
                warn!(head = %head.short_hex(), %path, "edit is shadowed on the new head");
                return Ok(EditState::ManualMergeRequired { head });
            }
            Err(e) => return Err(e.into()),
        };

        let merge_info = info
            .clone()
            .with_message(format!("Merge concurrent edit of {}", pending.edit.path()));
        let merge = write_commit(store, merged_tree, &[head, pending.candidate], &merge_info)?;
        if self.cas(Some(head), merge)? {
            info!(
                path = %pending.edit.path(),
                head = %head.short_hex(),
                merge = %merge.short_hex(),
                "auto-merged concurrent edit"
            );
            return Ok(EditState::Done {
                commit: merge,
                merged: true,
            });
        }
        self.classify(pending)
    }
}
