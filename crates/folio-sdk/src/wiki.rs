use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use folio_diff::{diff_pages, PageDiff};
use folio_merge::{CommitInfo, MergeController};
use folio_refs::{branch_ref, FsRefStore, InMemoryRefStore, RefStore};
use folio_store::{
    Commit, EntryMode, FsObjectStore, InMemoryObjectStore, ObjectStore, Tree, TreeEntry,
};
use folio_tree::{find_page_entry, resolve, PagePath, TreeError};
use folio_types::{Identity, ObjectId, Timestamp};
use tracing::debug;

use crate::config::{WikiConfig, CONFIG_FILE};
use crate::error::{SdkError, SdkResult};
use crate::format::PageFormat;
use crate::page::Page;

/// A page found by [`Wiki::list_pages`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageEntry {
    /// Page path without the format suffix.
    pub path: String,
    pub format: PageFormat,
    pub blob: ObjectId,
}

/// One commit in [`Wiki::history`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub id: ObjectId,
    pub commit: Commit,
}

/// A wiki: pages stored on one branch of a content-addressed object graph.
///
/// `Wiki` is a cheap handle. Clones share the same stores, and any number
/// of handles (in this process or others, for the filesystem backends) may
/// read and save concurrently.
#[derive(Clone)]
pub struct Wiki {
    store: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
    config: WikiConfig,
    ref_name: String,
}

impl fmt::Debug for Wiki {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wiki")
            .field("ref_name", &self.ref_name)
            .field("config", &self.config)
            .finish()
    }
}

impl Wiki {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefStore>,
        config: WikiConfig,
    ) -> SdkResult<Self> {
        config.validate()?;
        let ref_name = config.ref_name()?;
        Ok(Self {
            store,
            refs,
            config,
            ref_name,
        })
    }

    /// A wiki held entirely in memory, with default configuration.
    pub fn in_memory() -> SdkResult<Self> {
        Self::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryRefStore::new()),
            WikiConfig::default(),
        )
    }

    /// Create the repository layout under `root` (objects, refs and a
    /// default `folio.toml` unless one exists) and open it.
    pub fn init(root: impl AsRef<Path>) -> SdkResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            WikiConfig::default().save(&config_path)?;
        }
        Self::open(root)
    }

    /// Open a repository directory, reading `folio.toml` if present.
    pub fn open(root: impl AsRef<Path>) -> SdkResult<Self> {
        let root = root.as_ref();
        let config = WikiConfig::load_or_default(root.join(CONFIG_FILE))?;
        Self::open_with_config(root, config)
    }

    pub fn open_with_config(root: impl AsRef<Path>, config: WikiConfig) -> SdkResult<Self> {
        let root = root.as_ref();
        let store = FsObjectStore::open(root)?;
        let refs = FsRefStore::open(root)?;
        debug!(root = %root.display(), branch = %config.branch, "opened wiki");
        Self::new(Arc::new(store), Arc::new(refs), config)
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn refs(&self) -> &Arc<dyn RefStore> {
        &self.refs
    }

    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    /// The branch head, `None` while the wiki is empty.
    pub fn head(&self) -> SdkResult<Option<ObjectId>> {
        Ok(self.refs.read_ref(&self.ref_name)?)
    }

    /// Parse a page path. The empty path (or `/`) names the default page.
    pub fn parse_path(&self, path: &str) -> SdkResult<PagePath> {
        let path = if path.trim_matches('/').is_empty() {
            self.config.default_page.as_str()
        } else {
            path
        };
        Ok(PagePath::parse(path)?)
    }

    /// Load a page from the branch head.
    pub fn get_page(&self, path: &str) -> SdkResult<Page> {
        let path = self.parse_path(path)?;
        match self.head()? {
            Some(head) => self.load(path, head),
            None => Err(SdkError::PageNotFound(path.to_string())),
        }
    }

    /// Load a page from the head of another branch.
    pub fn get_page_at_branch(&self, path: &str, branch: &str) -> SdkResult<Page> {
        let path = self.parse_path(path)?;
        let ref_name = branch_ref(branch)?;
        let head = self
            .refs
            .read_ref(&ref_name)?
            .ok_or_else(|| SdkError::BranchNotFound(branch.to_string()))?;
        self.load(path, head)
    }

    /// Load a page as it was at `commit`. Saving it later merges into
    /// whatever the branch head is by then.
    pub fn get_page_at_commit(&self, path: &str, commit: ObjectId) -> SdkResult<Page> {
        let path = self.parse_path(path)?;
        self.load(path, commit)
    }

    /// Create an empty page on the branch head and save it with the message
    /// `Created <path>`.
    pub fn create_page(&self, path: &str, format: &str, author: &str) -> SdkResult<Page> {
        let mut page = self.draft_page(path, format, self.head()?)?;
        let message = format!("Created {}", page.path());
        page.save(author, &message)?;
        Ok(page)
    }

    /// An unsaved new page against `base` (`None` for an empty wiki).
    /// Fails with `PageExists` if a page already resolves at `path` there.
    pub fn draft_page(&self, path: &str, format: &str, base: Option<ObjectId>) -> SdkResult<Page> {
        let path = self.parse_path(path)?;
        if format.is_empty() || format.contains(['/', '\0']) {
            return Err(SdkError::InvalidPath {
                path: path.file_name(format),
                reason: "invalid format suffix".to_string(),
            });
        }
        let root = self.root_tree(base)?;
        match resolve(self.store.as_ref(), root.as_ref(), &path) {
            Ok(_) => return Err(SdkError::PageExists(path.to_string())),
            Err(TreeError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(Page::new(
            self.clone(),
            path,
            PageFormat::from_suffix(format),
            EntryMode::Regular,
            "\n".to_string(),
            None,
            base,
        ))
    }

    /// Every page in the tree of `commit` (the head when `None`), in tree
    /// order. A file is listed only if its page path resolves back to it.
    pub fn list_pages(&self, commit: Option<ObjectId>) -> SdkResult<Vec<PageEntry>> {
        let commit = match commit {
            Some(id) => Some(id),
            None => self.head()?,
        };
        let mut pages = Vec::new();
        if let Some(root) = self.root_tree(commit)? {
            let tree = self.store.get_tree(&root)?;
            self.collect_pages("", &tree, &mut pages)?;
        }
        Ok(pages)
    }

    fn collect_pages(&self, prefix: &str, tree: &Tree, out: &mut Vec<PageEntry>) -> SdkResult<()> {
        for entry in tree {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{prefix}/{}", entry.name)
            };
            if entry.mode.is_directory() {
                let subtree = self.store.get_tree(&entry.id)?;
                self.collect_pages(&path, &subtree, out)?;
                continue;
            }
            if let Some(page) = page_entry(tree, entry, &path) {
                out.push(page);
            }
        }
        Ok(())
    }

    /// Up to `limit` commits from the branch head, following first parents.
    pub fn history(&self, limit: usize) -> SdkResult<Vec<LogEntry>> {
        let mut log = Vec::new();
        let mut next = self.head()?;
        while let Some(id) = next {
            if log.len() >= limit {
                break;
            }
            let commit = self.store.get_commit(&id)?;
            next = commit.parents.first().copied();
            log.push(LogEntry { id, commit });
        }
        Ok(log)
    }

    /// Line diff of one page between two commits. A page missing on either
    /// side diffs as empty.
    pub fn diff_page(&self, path: &str, from: ObjectId, to: ObjectId) -> SdkResult<PageDiff> {
        let old = self.content_or_empty(path, from)?;
        let new = self.content_or_empty(path, to)?;
        Ok(diff_pages(&old, &new))
    }

    fn content_or_empty(&self, path: &str, commit: ObjectId) -> SdkResult<String> {
        match self.get_page_at_commit(path, commit) {
            Ok(page) => Ok(page.content().to_string()),
            Err(SdkError::PageNotFound(_)) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    fn load(&self, path: PagePath, commit: ObjectId) -> SdkResult<Page> {
        let root = self.root_tree(Some(commit))?;
        let found = resolve(self.store.as_ref(), root.as_ref(), &path)?;
        let blob = self.store.get_blob(&found.entry.id)?;
        let content =
            String::from_utf8(blob.data).map_err(|_| SdkError::InvalidContent(path.to_string()))?;
        debug!(path = %path, commit = %commit.short_hex(), format = %found.format, "page loaded");
        Ok(Page::new(
            self.clone(),
            path,
            PageFormat::from_suffix(found.format),
            found.entry.mode,
            content.clone(),
            Some(content),
            Some(commit),
        ))
    }

    fn root_tree(&self, commit: Option<ObjectId>) -> SdkResult<Option<ObjectId>> {
        match commit {
            Some(id) => Ok(Some(self.store.get_commit(&id)?.tree)),
            None => Ok(None),
        }
    }

    pub(crate) fn controller(&self) -> SdkResult<MergeController> {
        Ok(MergeController::new(
            Arc::clone(&self.store),
            Arc::clone(&self.refs),
            self.ref_name.clone(),
        )?
        .with_max_attempts(self.config.max_merge_attempts))
    }

    pub(crate) fn commit_info(&self, author: Identity, message: String) -> SdkResult<CommitInfo> {
        let timestamp = Timestamp::now(self.config.timezone_offset_minutes)?;
        Ok(CommitInfo::new(author, timestamp)
            .with_message(message)
            .with_encoding(self.config.encoding.clone()))
    }
}

/// The listing entry for a file, if looking its page name (the file name up
/// to its first dot, so the format matches what [`resolve`] reports) up in
/// `tree` finds this very file.
fn page_entry(tree: &Tree, entry: &TreeEntry, path: &str) -> Option<PageEntry> {
    let (name, _) = entry.name.split_once('.')?;
    if name.is_empty() {
        return None;
    }
    let (found, format) = find_page_entry(tree, name)?;
    if found.name != entry.name {
        return None;
    }
    let page_path = &path[..path.len() - entry.name.len() + name.len()];
    Some(PageEntry {
        path: page_path.to_string(),
        format: PageFormat::from_suffix(format),
        blob: entry.id,
    })
}
