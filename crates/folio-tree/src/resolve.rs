//! Read-only path resolution.

use folio_store::{ObjectStore, Tree, TreeEntry};
use folio_types::ObjectId;

use crate::error::{TreeError, TreeResult};
use crate::path::{join_path, PagePath};

/// A page located in a tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// The directory tree holding the page file.
    pub parent: Tree,
    /// The matched file entry.
    pub entry: TreeEntry,
    /// Everything after `<name>.` in the entry name.
    pub format: String,
}

/// Walk `dir` from `root`, returning `(segment, tree)` for every level
/// visited. The first pair is `("", root)`, the last is the tree at `dir`.
///
/// A missing segment fails with `NotFound` unless `create` is set, in which
/// case an empty in-memory tree stands in for it. A segment naming a
/// non-directory entry always fails with `PathShadowed`.
pub fn walk(
    store: &dyn ObjectStore,
    root: &Tree,
    dir: &[String],
    create: bool,
) -> TreeResult<Vec<(String, Tree)>> {
    let mut levels = Vec::with_capacity(dir.len() + 1);
    let mut current = root.clone();

    for (depth, segment) in dir.iter().enumerate() {
        let next = match current.get(segment) {
            Some(entry) if entry.mode.is_directory() => store.get_tree(&entry.id)?,
            Some(_) => {
                return Err(TreeError::PathShadowed {
                    path: join_path(&dir[..depth], segment),
                })
            }
            None if create => Tree::empty(),
            None => {
                return Err(TreeError::NotFound {
                    path: join_path(&dir[..depth], segment),
                })
            }
        };
        let name = if depth == 0 { "" } else { &dir[depth - 1] };
        levels.push((name.to_string(), current));
        current = next;
    }

    let last = dir.last().map(String::as_str).unwrap_or("");
    levels.push((last.to_string(), current));
    Ok(levels)
}

/// Find the page file for `name` in a single directory tree.
///
/// Entries are scanned in stored order; the first file entry whose name
/// starts with `<name>.` wins. Subtrees are skipped even when their name
/// matches.
pub fn find_page_entry<'a>(tree: &'a Tree, name: &str) -> Option<(&'a TreeEntry, &'a str)> {
    tree.iter()
        .filter(|entry| entry.mode.is_file())
        .find_map(|entry| {
            let format = entry.name.strip_prefix(name)?.strip_prefix('.')?;
            Some((entry, format))
        })
}

/// Resolve `path` against the root tree `root`. `None` is the empty tree
/// of an unborn branch.
pub fn resolve(
    store: &dyn ObjectStore,
    root: Option<&ObjectId>,
    path: &PagePath,
) -> TreeResult<Resolved> {
    let not_found = || TreeError::NotFound {
        path: path.to_string(),
    };
    let root = match root {
        Some(id) => store.get_tree(id)?,
        None => return Err(not_found()),
    };

    let (_, parent) = walk(store, &root, path.dir(), false)?
        .pop()
        .ok_or_else(not_found)?;
    let (entry, format) = find_page_entry(&parent, path.name()).ok_or_else(not_found)?;
    let (entry, format) = (entry.clone(), format.to_string());
    Ok(Resolved {
        parent,
        entry,
        format,
    })
}
