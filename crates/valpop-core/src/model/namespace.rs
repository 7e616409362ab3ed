use crate::errors::ValpopError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical scope for one published asset tree.
///
/// Namespaces are embedded verbatim in backend keys (`data:<ns>:...` and
/// `manifests/<ns>/...`), so both key separators are rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValpopError> {
        let raw = raw.into();
        let reason = if raw.trim().is_empty() {
            Some("must not be empty")
        } else if raw.contains(':') || raw.contains('/') {
            Some("must not contain ':' or '/'")
        } else if raw == "." || raw == ".." {
            Some("must not be a relative directory marker")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ValpopError::InvalidNamespace {
                namespace: raw,
                reason: reason.to_string(),
            }),
            None => Ok(Self(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Namespace {
    type Error = ValpopError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
