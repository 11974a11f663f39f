//! Tree-level diff: compare two root trees and list the file entries that
//! differ, with full slash-separated paths.
//!
//! Subtrees with identical ids are skipped without being loaded, so the
//! cost is proportional to the part of the tree that actually changed.
//! Directory entries never appear as changes themselves; a directory that
//! appears or disappears contributes one change per file below it.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use folio_store::{EntryMode, ObjectStore, Tree, TreeEntry};
use folio_types::ObjectId;

use crate::error::DiffResult;

/// The result of comparing two trees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeDiff {
    pub changes: Vec<TreeChange>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Every file path the diff touches.
    pub fn touched_paths(&self) -> BTreeSet<String> {
        self.changes.iter().map(|c| c.path().to_string()).collect()
    }
}

/// A single file-level change between two trees.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeChange {
    Added {
        path: String,
        id: ObjectId,
        mode: EntryMode,
    },
    Deleted {
        path: String,
        id: ObjectId,
        mode: EntryMode,
    },
    /// Same path, different content.
    Modified {
        path: String,
        old_id: ObjectId,
        new_id: ObjectId,
        mode: EntryMode,
    },
    /// Same content, different mode.
    ModeChanged {
        path: String,
        id: ObjectId,
        old_mode: EntryMode,
        new_mode: EntryMode,
    },
}

impl TreeChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. }
            | Self::Deleted { path, .. }
            | Self::Modified { path, .. }
            | Self::ModeChanged { path, .. } => path,
        }
    }
}

/// Compare two root trees by id. `None` stands for the empty tree (an
/// unborn branch).
pub fn diff_trees(
    store: &dyn ObjectStore,
    old_tree: Option<&ObjectId>,
    new_tree: Option<&ObjectId>,
) -> DiffResult<TreeDiff> {
    let mut diff = TreeDiff::default();
    if old_tree == new_tree {
        return Ok(diff);
    }
    let old = load(store, old_tree)?;
    let new = load(store, new_tree)?;
    diff_dir(store, "", &old, &new, &mut diff.changes)?;
    Ok(diff)
}

/// `true` if editing `a` and editing `b` touch the same file, or one path
/// is a directory prefix of the other (a file at `a` would shadow the
/// directory holding `b`).
///
/// Two files in the same directory with the same stem (the name up to its
/// first `.`) also overlap: `new.mdown` and `new.rst` compete for page
/// `new`, and only one of them resolves.
pub fn paths_overlap(a: &str, b: &str) -> bool {
    fn is_dir_prefix(prefix: &str, path: &str) -> bool {
        path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'/'
    }
    a == b || is_dir_prefix(a, b) || is_dir_prefix(b, a) || same_page_stem(a, b)
}

fn same_page_stem(a: &str, b: &str) -> bool {
    fn split(path: &str) -> (&str, &str) {
        let (dir, file) = path.rsplit_once('/').unwrap_or(("", path));
        (dir, file.split('.').next().unwrap_or(file))
    }
    split(a) == split(b)
}

/// The first pair of overlapping paths between two touched-path sets.
pub fn first_overlap<'a>(
    ours: &'a BTreeSet<String>,
    theirs: &'a BTreeSet<String>,
) -> Option<(&'a str, &'a str)> {
    ours.iter().find_map(|a| {
        theirs
            .iter()
            .find(|b| paths_overlap(a, b))
            .map(|b| (a.as_str(), b.as_str()))
    })
}

fn load(store: &dyn ObjectStore, id: Option<&ObjectId>) -> DiffResult<Tree> {
    Ok(match id {
        Some(id) => store.get_tree(id)?,
        None => Tree::empty(),
    })
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn diff_dir(
    store: &dyn ObjectStore,
    prefix: &str,
    old: &Tree,
    new: &Tree,
    out: &mut Vec<TreeChange>,
) -> DiffResult<()> {
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        let order = match (old_iter.peek(), new_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(o), Some(n)) => o.name.cmp(&n.name),
        };
        match order {
            Ordering::Less => {
                if let Some(o) = old_iter.next() {
                    removed(store, prefix, o, out)?;
                }
            }
            Ordering::Greater => {
                if let Some(n) = new_iter.next() {
                    added(store, prefix, n, out)?;
                }
            }
            Ordering::Equal => {
                if let (Some(o), Some(n)) = (old_iter.next(), new_iter.next()) {
                    changed(store, prefix, o, n, out)?;
                }
            }
        }
    }
    Ok(())
}

fn changed(
    store: &dyn ObjectStore,
    prefix: &str,
    old: &TreeEntry,
    new: &TreeEntry,
    out: &mut Vec<TreeChange>,
) -> DiffResult<()> {
    if old.id == new.id && old.mode == new.mode {
        return Ok(());
    }
    let path = join(prefix, &old.name);
    match (old.mode.is_directory(), new.mode.is_directory()) {
        (true, true) => {
            let old_tree = store.get_tree(&old.id)?;
            let new_tree = store.get_tree(&new.id)?;
            diff_dir(store, &path, &old_tree, &new_tree, out)?;
        }
        (false, false) if old.id != new.id => out.push(TreeChange::Modified {
            path,
            old_id: old.id,
            new_id: new.id,
            mode: new.mode,
        }),
        (false, false) => out.push(TreeChange::ModeChanged {
            path,
            id: old.id,
            old_mode: old.mode,
            new_mode: new.mode,
        }),
        // File replaced by directory or the reverse.
        _ => {
            removed(store, prefix, old, out)?;
            added(store, prefix, new, out)?;
        }
    }
    Ok(())
}

fn added(
    store: &dyn ObjectStore,
    prefix: &str,
    entry: &TreeEntry,
    out: &mut Vec<TreeChange>,
) -> DiffResult<()> {
    let path = join(prefix, &entry.name);
    if entry.mode.is_directory() {
        let tree = store.get_tree(&entry.id)?;
        return diff_dir(store, &path, &Tree::empty(), &tree, out);
    }
    out.push(TreeChange::Added {
        path,
        id: entry.id,
        mode: entry.mode,
    });
    Ok(())
}

fn removed(
    store: &dyn ObjectStore,
    prefix: &str,
    entry: &TreeEntry,
    out: &mut Vec<TreeChange>,
) -> DiffResult<()> {
    let path = join(prefix, &entry.name);
    if entry.mode.is_directory() {
        let tree = store.get_tree(&entry.id)?;
        return diff_dir(store, &path, &tree, &Tree::empty(), out);
    }
    out.push(TreeChange::Deleted {
        path,
        id: entry.id,
        mode: entry.mode,
    });
    Ok(())
}
