//! Logical page paths.

use std::fmt;

use crate::error::{TreeError, TreeResult};

/// A validated page path: zero or more directory segments and a page name.
///
/// The name carries no format suffix; `docs/setup` resolves to a file such
/// as `docs/setup.mdown`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PagePath {
    dir: Vec<String>,
    name: String,
}

impl PagePath {
    /// Parse a `/`-separated path. Leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> TreeResult<Self> {
        let trimmed = path.trim_matches('/');
        let invalid = |reason: &str| TreeError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            check_segment(segment).map_err(invalid)?;
            segments.push(segment.to_string());
        }
        let name = segments.pop().ok_or_else(|| invalid("empty path"))?;
        Ok(Self {
            dir: segments,
            name,
        })
    }

    /// Directory segments, outermost first.
    pub fn dir(&self) -> &[String] {
        &self.dir
    }

    /// The final segment: the page name without its format suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored file name for this page in the given format.
    pub fn file_name(&self, format: &str) -> String {
        format!("{}.{}", self.name, format)
    }

    /// The full slash path of the stored file, as it appears in tree diffs.
    pub fn file_path(&self, format: &str) -> String {
        join_path(&self.dir, &self.file_name(format))
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.dir {
            write!(f, "{segment}/")?;
        }
        f.write_str(&self.name)
    }
}

impl std::str::FromStr for PagePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Join directory segments and a final name with `/`.
pub fn join_path(dir: &[String], name: &str) -> String {
    let mut path = dir.join("/");
    if !path.is_empty() {
        path.push('/');
    }
    path.push_str(name);
    path
}

fn check_segment(segment: &str) -> Result<(), &'static str> {
    match segment {
        "" => Err("empty segment"),
        "." | ".." => Err("relative segment"),
        _ if segment.contains('\0') => Err("NUL byte in segment"),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_nested() {
        let path = PagePath::parse("docs/setup/linux").unwrap();
        assert_eq!(path.dir(), ["docs", "setup"]);
        assert_eq!(path.name(), "linux");
        assert_eq!(path.file_name("mdown"), "linux.mdown");
        assert_eq!(path.file_path("rst"), "docs/setup/linux.rst");
    }

    #[test]
    fn parse_top_level() {
        let path: PagePath = "index".parse().unwrap();
        assert!(path.dir().is_empty());
        assert_eq!(path.file_path("mdown"), "index.mdown");
    }

    #[test]
    fn surrounding_slashes_trimmed() {
        assert_eq!(
            PagePath::parse("/test/test/").unwrap(),
            PagePath::parse("test/test").unwrap()
        );
    }

    #[test]
    fn rejects_bad_paths() {
        for bad in ["", "/", "//", "a//b", "a/./b", "../a", "a/..", "a\0b"] {
            assert!(
                matches!(PagePath::parse(bad), Err(TreeError::InvalidPath { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn unicode_segments() {
        let path = PagePath::parse("Ünïcödé/日本語").unwrap();
        assert_eq!(path.name(), "日本語");
        assert_eq!(path.to_string(), "Ünïcödé/日本語");
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(segments in prop::collection::vec("[a-zA-Z0-9_ é-]{1,8}", 1..5)) {
            let raw = segments.join("/");
            let path = PagePath::parse(&raw).unwrap();
            prop_assert_eq!(path.to_string(), raw.clone());
            prop_assert_eq!(PagePath::parse(&path.to_string()).unwrap(), path.clone());
            prop_assert_eq!(path.dir().len() + 1, segments.len());
        }

        #[test]
        fn file_path_prefixes_dir(segments in prop::collection::vec("[a-z]{1,6}", 1..5), format in "[a-z]{1,5}") {
            let path = PagePath::parse(&segments.join("/")).unwrap();
            let file_path = path.file_path(&format);
            prop_assert!(file_path.starts_with(&path.to_string()));
            let suffix = format!(".{format}");
            prop_assert!(file_path.ends_with(&suffix));
        }
    }
}
