//! Page-level diff: line-by-line comparison of two revisions of a page.
//!
//! Page content is decoded text by the time it gets here, so there is no
//! binary fallback. Hunks carry three lines of context and render in
//! unified format for the CLI.

use std::fmt::Write as _;

use similar::{ChangeTag, TextDiff};

const CONTEXT_LINES: usize = 3;

/// The result of diffing two page revisions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageDiff {
    pub hunks: Vec<DiffHunk>,
}

impl PageDiff {
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }

    /// Render as a unified diff body (no file headers).
    pub fn unified(&self) -> String {
        let mut out = String::new();
        for hunk in &self.hunks {
            let _ = writeln!(
                out,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
            );
            for line in &hunk.lines {
                let _ = writeln!(out, "{line}");
            }
        }
        out
    }
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// 1-based start line in the old revision.
    pub old_start: usize,
    pub old_count: usize,
    /// 1-based start line in the new revision.
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line in a hunk, without its trailing newline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

impl std::fmt::Display for DiffLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Context(text) => write!(f, " {text}"),
            Self::Added(text) => write!(f, "+{text}"),
            Self::Removed(text) => write!(f, "-{text}"),
        }
    }
}

/// Compute a line diff between two page revisions.
pub fn diff_pages(old: &str, new: &str) -> PageDiff {
    if old == new {
        return PageDiff::default();
    }

    let text_diff = TextDiff::from_lines(old, new);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut hunk = DiffHunk {
            old_start: first.old_range().start + 1,
            old_count: 0,
            new_start: first.new_range().start + 1,
            new_count: 0,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        hunk.lines.push(DiffLine::Context(text));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    ChangeTag::Delete => {
                        hunk.lines.push(DiffLine::Removed(text));
                        hunk.old_count += 1;
                    }
                    ChangeTag::Insert => {
                        hunk.lines.push(DiffLine::Added(text));
                        hunk.new_count += 1;
                    }
                }
            }
        }
        hunks.push(hunk);
    }

    PageDiff { hunks }
}
