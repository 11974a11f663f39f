use folio_merge::{EditOutcome, PageEdit};
use folio_store::{Blob, EntryMode, ObjectStore};
use folio_tree::PagePath;
use folio_types::{Identity, ObjectId};
use tracing::debug;

use crate::error::SdkResult;
use crate::format::PageFormat;
use crate::wiki::Wiki;

/// A page loaded from (or drafted against) one commit.
///
/// Edit the content in memory with [`set_content`](Self::set_content), then
/// [`save`](Self::save). Keep [`base_commit`](Self::base_commit) around if
/// the edit may be finished later: [`Wiki::get_page_at_commit`] returns the
/// same page, and saving it merges into whatever the head is by then.
#[derive(Clone, Debug)]
pub struct Page {
    wiki: Wiki,
    path: PagePath,
    format: PageFormat,
    mode: EntryMode,
    content: String,
    /// Content as of `base`; `None` for a page not stored yet.
    saved: Option<String>,
    base: Option<ObjectId>,
}

impl Page {
    pub(crate) fn new(
        wiki: Wiki,
        path: PagePath,
        format: PageFormat,
        mode: EntryMode,
        content: String,
        saved: Option<String>,
        base: Option<ObjectId>,
    ) -> Self {
        Self {
            wiki,
            path,
            format,
            mode,
            content,
            saved,
            base,
        }
    }

    pub fn path(&self) -> &PagePath {
        &self.path
    }

    pub fn format(&self) -> &PageFormat {
        &self.format
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// The commit this page was read from, or last saved to.
    pub fn base_commit(&self) -> Option<ObjectId> {
        self.base
    }

    /// `true` if saving would write a new revision.
    pub fn is_modified(&self) -> bool {
        self.saved.as_deref() != Some(with_trailing_newline(&self.content).as_str())
    }

    /// Save the page and return the commit the branch now points at (the
    /// base commit if nothing changed).
    ///
    /// An empty `message` becomes `Edited <path>`.
    pub fn save(&mut self, author: &str, message: &str) -> SdkResult<ObjectId> {
        Ok(self.save_detailed(author, message)?.commit)
    }

    /// Like [`save`](Self::save), but reports whether the save
    /// fast-forwarded, merged or was a no-op.
    pub fn save_detailed(&mut self, author: &str, message: &str) -> SdkResult<EditOutcome> {
        let author = Identity::new(author)?;
        let content = with_trailing_newline(&self.content);

        if let (Some(saved), Some(base)) = (self.saved.as_deref(), self.base) {
            if saved == content {
                debug!(path = %self.path, "page unchanged, nothing to save");
                self.content = content;
                return Ok(EditOutcome {
                    commit: base,
                    candidate: None,
                    merged: false,
                });
            }
        }

        let store = self.wiki.store();
        let blob = store.put_blob(&Blob::new(content.as_bytes()))?;
        let edit = PageEdit::new(
            self.path.dir().to_vec(),
            self.path.file_name(self.format.suffix()),
            blob,
        )
        .with_mode(self.mode);

        let message = if message.is_empty() {
            format!("Edited {}", self.path)
        } else {
            message.to_string()
        };
        let info = self.wiki.commit_info(author, message)?;
        let outcome = self
            .wiki
            .controller()?
            .commit_page_edit(self.base, &edit, &info)?;

        self.base = Some(outcome.commit);
        self.saved = Some(content.clone());
        self.content = content;
        Ok(outcome)
    }
}

fn with_trailing_newline(content: &str) -> String {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
