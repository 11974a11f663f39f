//! Bottom-up tree rewriting.
//!
//! Trees are immutable, so changing one entry deep in the hierarchy means
//! writing a new tree for that directory and for every ancestor up to the
//! root. Untouched siblings are carried over by id and never copied.

use folio_store::{EntryMode, ObjectStore, Tree, TreeEntry};
use folio_types::ObjectId;
use tracing::debug;

use crate::error::TreeResult;
use crate::resolve::walk;

/// Replace the tree at `dir` under `root` with `new_leaf` and persist the
/// new leaf and all of its ancestors. Returns the new root tree id.
///
/// Missing directories are created when `create_missing` is set; otherwise
/// they fail with `NotFound`.
pub fn rewrite(
    store: &dyn ObjectStore,
    root: &Tree,
    dir: &[String],
    new_leaf: Tree,
    create_missing: bool,
) -> TreeResult<ObjectId> {
    let mut levels = walk(store, root, dir, create_missing)?;
    if let Some(last) = levels.last_mut() {
        last.1 = new_leaf;
    }
    rebuild(store, levels)
}

/// Store `blob` as `file_name` in directory `dir` of the tree `root`
/// (`None` for an unborn branch), creating directories as needed. Returns
/// the new root tree id.
pub fn put_file(
    store: &dyn ObjectStore,
    root: Option<&ObjectId>,
    dir: &[String],
    file_name: &str,
    blob: ObjectId,
    mode: EntryMode,
) -> TreeResult<ObjectId> {
    let root = match root {
        Some(id) => store.get_tree(id)?,
        None => Tree::empty(),
    };
    let mut levels = walk(store, &root, dir, true)?;
    if let Some((_, leaf)) = levels.last_mut() {
        leaf.insert(TreeEntry::new(mode, file_name, blob));
    }
    rebuild(store, levels)
}

/// Persist `levels` deepest first, pointing each parent at its freshly
/// written child.
fn rebuild(store: &dyn ObjectStore, mut levels: Vec<(String, Tree)>) -> TreeResult<ObjectId> {
    let mut child: Option<(String, ObjectId)> = None;
    while let Some((name, mut tree)) = levels.pop() {
        if let Some((child_name, child_id)) = child.take() {
            tree.insert(TreeEntry::new(EntryMode::Directory, child_name, child_id));
        }
        let id = store.put_tree(&tree)?;
        child = Some((name, id));
    }
    let root_id = match child {
        Some((_, id)) => id,
        None => store.put_tree(&Tree::empty())?,
    };
    debug!(root = %root_id.short_hex(), "tree rewritten");
    Ok(root_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::path::PagePath;
    use crate::resolve::resolve;
    use folio_store::{Blob, InMemoryObjectStore};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn segs(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn blob(store: &InMemoryObjectStore, text: &str) -> ObjectId {
        store.put_blob(&Blob::new(text)).unwrap()
    }

    fn read_page(store: &InMemoryObjectStore, root: &ObjectId, path: &str) -> Vec<u8> {
        let found = resolve(store, Some(root), &PagePath::parse(path).unwrap()).unwrap();
        store.get_blob(&found.entry.id).unwrap().data
    }

    #[test]
    fn put_file_into_unborn_root() {
        let store = InMemoryObjectStore::new();
        let a = blob(&store, "A\n");
        let root = put_file(&store, None, &[], "index.mdown", a, EntryMode::Regular).unwrap();
        assert_eq!(read_page(&store, &root, "index"), b"A\n");
        assert_eq!(store.get_tree(&root).unwrap().len(), 1);
    }

    #[test]
    fn put_file_creates_intermediate_dirs() {
        let store = InMemoryObjectStore::new();
        let a = blob(&store, "A\n");
        let c = blob(&store, "C\n");
        let root = put_file(&store, None, &[], "index.mdown", a, EntryMode::Regular).unwrap();
        let root =
            put_file(&store, Some(&root), &segs("test"), "test.mdown", c, EntryMode::Regular)
                .unwrap();

        assert_eq!(read_page(&store, &root, "index"), b"A\n");
        assert_eq!(read_page(&store, &root, "test/test"), b"C\n");
        let top = store.get_tree(&root).unwrap();
        assert_eq!(top.get("test").unwrap().mode, EntryMode::Directory);
    }

    #[test]
    fn put_file_replaces_existing_entry() {
        let store = InMemoryObjectStore::new();
        let a = blob(&store, "A\n");
        let b = blob(&store, "B\n");
        let root = put_file(&store, None, &[], "index.mdown", a, EntryMode::Regular).unwrap();
        let root =
            put_file(&store, Some(&root), &[], "index.mdown", b, EntryMode::Regular).unwrap();
        assert_eq!(read_page(&store, &root, "index"), b"B\n");
        assert_eq!(store.get_tree(&root).unwrap().len(), 1);
    }

    #[test]
    fn only_the_edited_path_gets_new_trees() {
        let store = InMemoryObjectStore::new();
        let v1 = blob(&store, "one\n");
        let v2 = blob(&store, "two\n");
        let sibling = blob(&store, "sibling\n");

        let root = put_file(&store, None, &segs("x/y/z"), "leaf.mdown", v1, EntryMode::Regular)
            .unwrap();
        let root = put_file(&store, Some(&root), &segs("s/t"), "p.mdown", sibling, EntryMode::Regular)
            .unwrap();
        let sibling_before = store.get_tree(&root).unwrap().get("s").unwrap().id;

        let trees_before: HashSet<ObjectId> = store.all_ids().into_iter().collect();
        let new_root =
            put_file(&store, Some(&root), &segs("x/y/z"), "leaf.mdown", v2, EntryMode::Regular)
                .unwrap();
        let created: HashSet<ObjectId> = store
            .all_ids()
            .into_iter()
            .filter(|id| !trees_before.contains(id))
            .collect();

        let top = store.get_tree(&new_root).unwrap();
        let x = top.get("x").unwrap().id;
        let y = store.get_tree(&x).unwrap().get("y").unwrap().id;
        let z = store.get_tree(&y).unwrap().get("z").unwrap().id;
        let expected: HashSet<ObjectId> = [new_root, x, y, z].into();
        assert_eq!(created, expected);
        assert_eq!(top.get("s").unwrap().id, sibling_before);
    }

    #[test]
    fn rewrite_replaces_leaf_tree() {
        let store = InMemoryObjectStore::new();
        let a = blob(&store, "A\n");
        let root = put_file(&store, None, &segs("d"), "old.mdown", a, EntryMode::Regular).unwrap();
        let root_tree = store.get_tree(&root).unwrap();

        let leaf = Tree::new(vec![TreeEntry::new(EntryMode::Regular, "new.mdown", a)]);
        let new_root = rewrite(&store, &root_tree, &segs("d"), leaf, false).unwrap();

        let d = store.get_tree(&new_root).unwrap().get("d").unwrap().id;
        let d = store.get_tree(&d).unwrap();
        assert!(d.get("old.mdown").is_none());
        assert!(d.get("new.mdown").is_some());
    }

    #[test]
    fn rewrite_without_create_fails_on_missing_dir() {
        let store = InMemoryObjectStore::new();
        let before = store.len();
        let result = rewrite(&store, &Tree::empty(), &segs("a/b"), Tree::empty(), false);
        assert!(matches!(result, Err(TreeError::NotFound { path }) if path == "a"));
        assert_eq!(store.len(), before);
    }

    #[test]
    fn rewrite_through_file_is_shadowed() {
        let store = InMemoryObjectStore::new();
        let a = blob(&store, "A\n");
        let root = put_file(&store, None, &[], "test", a, EntryMode::Regular).unwrap();
        let result = put_file(
            &store,
            Some(&root),
            &segs("test"),
            "test.mdown",
            a,
            EntryMode::Regular,
        );
        assert!(matches!(result, Err(TreeError::PathShadowed { .. })));
    }

    #[test]
    fn rewrite_at_root_replaces_root() {
        let store = InMemoryObjectStore::new();
        let a = blob(&store, "A\n");
        let leaf = Tree::new(vec![TreeEntry::new(EntryMode::Regular, "index.mdown", a)]);
        let expected = leaf.id().unwrap();
        let root = rewrite(&store, &Tree::empty(), &[], leaf, true).unwrap();
        assert_eq!(root, expected);
    }

    proptest! {
        #[test]
        fn put_then_resolve(
            dir in prop::collection::vec("[a-z]{1,4}", 0..4),
            name in "[a-z]{1,6}",
            content in "[ -~]{0,32}",
        ) {
            let store = InMemoryObjectStore::new();
            let seed = blob(&store, "seed\n");
            let root = put_file(&store, None, &[], "zzz-other.md", seed, EntryMode::Regular).unwrap();

            let id = blob(&store, &content);
            let file_name = format!("{name}.mdown");
            let new_root = put_file(&store, Some(&root), &dir, &file_name, id, EntryMode::Regular).unwrap();

            let mut page = dir.join("/");
            if !page.is_empty() {
                page.push('/');
            }
            page.push_str(&name);
            let found = resolve(&store, Some(&new_root), &PagePath::parse(&page).unwrap()).unwrap();
            prop_assert_eq!(found.entry.id, id);
            prop_assert_eq!(found.format, "mdown");

            let other = resolve(&store, Some(&new_root), &PagePath::parse("zzz-other").unwrap()).unwrap();
            prop_assert_eq!(other.entry.id, seed);
        }

        #[test]
        fn rewrite_is_deterministic(
            dir in prop::collection::vec("[a-z]{1,4}", 0..4),
            name in "[a-z]{1,6}",
        ) {
            let store = InMemoryObjectStore::new();
            let id = blob(&store, "same\n");
            let a = put_file(&store, None, &dir, &name, id, EntryMode::Regular).unwrap();
            let b = put_file(&store, None, &dir, &name, id, EntryMode::Regular).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
