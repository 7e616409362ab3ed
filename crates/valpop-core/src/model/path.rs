use crate::errors::ValpopError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// `/`-separated path of a file relative to the published root.
///
/// This is the stable cross-generation identity of a logical file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValpopError> {
        let raw = raw.into();
        let invalid = |reason: &str| ValpopError::InvalidRelativePath {
            path: raw.clone(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if raw.starts_with('/') {
            return Err(invalid("must be relative"));
        }
        if raw.contains('\\') {
            return Err(invalid("must use '/' as separator"));
        }
        for segment in raw.split('/') {
            match segment {
                "" => return Err(invalid("must not contain empty segments")),
                "." | ".." => return Err(invalid("must not contain '.' or '..' segments")),
                _ => {}
            }
        }

        Ok(Self(raw))
    }

    /// Build a relative path from a filesystem path below a walk root.
    pub fn from_fs_path(path: &Path) -> Result<Self, ValpopError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(segment) => match segment.to_str() {
                    Some(s) => segments.push(s.to_string()),
                    None => {
                        return Err(ValpopError::InvalidRelativePath {
                            path: path.display().to_string(),
                            reason: "must be valid UTF-8".to_string(),
                        })
                    }
                },
                Component::CurDir => {}
                _ => {
                    return Err(ValpopError::InvalidRelativePath {
                        path: path.display().to_string(),
                        reason: "must stay below the walk root".to_string(),
                    })
                }
            }
        }
        Self::new(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path segments, for joining onto a filesystem root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RelativePath {
    type Error = ValpopError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<RelativePath> for String {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for RelativePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
