use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An author or committer identity, conventionally `Name <email>`.
///
/// Any non-empty single-line string is accepted; the `Name <email>` shape is
/// recognized but not required.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    pub fn new(identity: impl Into<String>) -> Result<Self, TypeError> {
        let identity = identity.into();
        let trimmed = identity.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidIdentity {
                identity,
                reason: "identity must not be empty".into(),
            });
        }
        if trimmed.contains(['\n', '\r', '\0']) {
            return Err(TypeError::InvalidIdentity {
                identity,
                reason: "identity must be a single line".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before `<`, or the whole identity when there is no email.
    pub fn name(&self) -> &str {
        match self.0.split_once('<') {
            Some((name, _)) => name.trim_end(),
            None => &self.0,
        }
    }

    /// The address between `<` and `>`, if present.
    pub fn email(&self) -> Option<&str> {
        let (_, rest) = self.0.split_once('<')?;
        let (email, _) = rest.split_once('>')?;
        Some(email)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Identity {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}
