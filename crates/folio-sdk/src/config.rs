//! Wiki configuration, stored as `folio.toml` in the repository root.

use std::fs;
use std::path::Path;

use folio_refs::branch_ref;
use folio_tree::PagePath;
use folio_types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// File name of the configuration inside a repository directory.
pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// The wiki branch. Its ref is `refs/heads/<branch>`.
    pub branch: String,
    /// Page served for the empty path.
    pub default_page: String,
    /// Ref CAS attempts per save before giving up with contention.
    pub max_merge_attempts: usize,
    /// UTC offset recorded in new commits.
    pub timezone_offset_minutes: i32,
    /// Encoding tag written into commits. Only UTF-8 is supported.
    pub encoding: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            default_page: "index".to_string(),
            max_merge_attempts: folio_merge::DEFAULT_MAX_ATTEMPTS,
            timezone_offset_minutes: 0,
            encoding: folio_merge::DEFAULT_ENCODING.to_string(),
        }
    }
}

impl WikiConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> SdkResult<()> {
        branch_ref(&self.branch)
            .map_err(|e| SdkError::Config(format!("branch: {e}")))?;
        PagePath::parse(&self.default_page)
            .map_err(|e| SdkError::Config(format!("default_page: {e}")))?;
        if self.max_merge_attempts == 0 {
            return Err(SdkError::Config(
                "max_merge_attempts must be at least 1".to_string(),
            ));
        }
        Timestamp::new(0, self.timezone_offset_minutes)
            .map_err(|e| SdkError::Config(format!("timezone_offset_minutes: {e}")))?;
        if !is_utf8_label(&self.encoding) {
            return Err(SdkError::Config(format!(
                "unsupported encoding {:?}, only utf-8 is supported",
                self.encoding
            )));
        }
        Ok(())
    }

    /// The full ref name of the wiki branch.
    pub fn ref_name(&self) -> SdkResult<String> {
        Ok(branch_ref(&self.branch)?)
    }
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WikiConfig::default();
        assert_eq!(config.branch, "main");
        assert_eq!(config.default_page, "index");
        assert_eq!(config.max_merge_attempts, 5);
        assert_eq!(config.timezone_offset_minutes, 0);
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.ref_name().unwrap(), "refs/heads/main");
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: WikiConfig = toml::from_str("branch = \"drafts\"\n").unwrap();
        assert_eq!(config.branch, "drafts");
        assert_eq!(config.default_page, "index");
        assert_eq!(config.max_merge_attempts, 5);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = WikiConfig {
            branch: "wiki".into(),
            default_page: "home/start".into(),
            max_merge_attempts: 9,
            timezone_offset_minutes: -300,
            encoding: "UTF-8".into(),
        };
        config.save(&path).unwrap();
        assert_eq!(WikiConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WikiConfig::load_or_default(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, WikiConfig::default());
        assert!(matches!(
            WikiConfig::load(dir.path().join(CONFIG_FILE)),
            Err(SdkError::Io(_))
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        let cases = [
            WikiConfig {
                branch: "bad..name".into(),
                ..WikiConfig::default()
            },
            WikiConfig {
                default_page: "".into(),
                ..WikiConfig::default()
            },
            WikiConfig {
                max_merge_attempts: 0,
                ..WikiConfig::default()
            },
            WikiConfig {
                timezone_offset_minutes: 24 * 60,
                ..WikiConfig::default()
            },
            WikiConfig {
                encoding: "latin-1".into(),
                ..WikiConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(SdkError::Config(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "max_merge_attempts = \"many\"").unwrap();
        assert!(matches!(WikiConfig::load(&path), Err(SdkError::Config(_))));
    }
}
