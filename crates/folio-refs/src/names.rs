//! Ref name validation following git-style conventions.
//!
//! A valid name:
//! - is non-empty
//! - contains no whitespace or any of `~ ^ : ? * [ \`
//! - contains neither `..` nor `@{`
//! - does not start or end with `.` or `/`
//! - does not end with `.lock`
//! - has non-empty `/`-separated components, none starting with `.`
//!
//! Canonical ref names additionally start with `refs/`.

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '~', '^', ':', '?', '*', '[', '\\'];

fn check(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".into());
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(format!("contains forbidden character: {ch:?}"));
    }
    if name.contains("..") {
        return Err("must not contain '..'".into());
    }
    if name.contains("@{") {
        return Err("must not contain '@{'".into());
    }
    if name.starts_with(['.', '/']) || name.ends_with(['.', '/']) {
        return Err("must not start or end with '.' or '/'".into());
    }
    if name.ends_with(".lock") {
        return Err("must not end with '.lock'".into());
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Err("path components must not be empty".into());
        }
        if component.starts_with('.') {
            return Err(format!("component must not start with '.': {component:?}"));
        }
    }
    Ok(())
}

/// Validate a short branch name such as `main` or `feature/auth`.
///
/// ```
/// use folio_refs::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    check(name).map_err(|reason| RefError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Validate a canonical ref name such as `refs/heads/main`.
pub fn validate_ref_name(name: &str) -> Result<()> {
    let invalid = |reason: String| RefError::InvalidName {
        name: name.to_string(),
        reason,
    };
    let rest = name
        .strip_prefix("refs/")
        .ok_or_else(|| invalid("must start with 'refs/'".into()))?;
    check(rest).map_err(invalid)
}

/// Canonical ref name of a branch.
pub fn branch_ref(branch: &str) -> Result<String> {
    validate_branch_name(branch)?;
    Ok(format!("refs/heads/{branch}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["main", "my-branch", "v1.0", "feature/auth", "user/alice/fix-123"] {
            assert!(validate_branch_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejected_names() {
        for name in [
            "",
            "bad..name",
            "has space",
            "has\ttab",
            "a~b",
            "a^b",
            "a:b",
            "a?b",
            "a*b",
            "a[b",
            "a\\b",
            ".hidden",
            "trailing.",
            "/leading",
            "trailing/",
            "a//b",
            "main.lock",
            "ref@{0}",
            "feature/.hidden",
        ] {
            assert!(validate_branch_name(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn canonical_names_need_refs_prefix() {
        assert!(validate_ref_name("refs/heads/main").is_ok());
        assert!(validate_ref_name("heads/main").is_err());
        assert!(validate_ref_name("refs/").is_err());
        assert!(validate_ref_name("refs/heads/bad..x").is_err());
    }

    #[test]
    fn branch_ref_formats_canonical_name() {
        assert_eq!(branch_ref("main").unwrap(), "refs/heads/main");
        assert!(matches!(
            branch_ref("a b"),
            Err(RefError::InvalidName { .. })
        ));
    }
}
