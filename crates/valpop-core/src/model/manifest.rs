//! Per-generation path index used by the object-store variant.
//!
//! A manifest is written once, as a whole object, after every item of its
//! generation has been uploaded. Its existence is the generation's
//! visibility witness.
//!
//! Wire format: a JSON array of relative path strings, sorted.

use super::{GenerationId, RelativePath};
use crate::errors::ValpopError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    paths: BTreeSet<RelativePath>,
}

impl Manifest {
    pub fn new(paths: BTreeSet<RelativePath>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &BTreeSet<RelativePath> {
        &self.paths
    }

    pub fn into_paths(self) -> BTreeSet<RelativePath> {
        self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Encode to the manifest wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        // A set of validated strings always serializes.
        serde_json::to_vec(&self.paths).unwrap_or_else(|_| b"[]".to_vec())
    }

    /// Decode a manifest payload read back for `generation`.
    pub fn from_bytes(generation: GenerationId, bytes: &[u8]) -> Result<Self, ValpopError> {
        serde_json::from_slice::<BTreeSet<RelativePath>>(bytes)
            .map(Self::new)
            .map_err(|e| ValpopError::MalformedManifest {
                generation,
                reason: e.to_string(),
            })
    }
}

impl FromIterator<RelativePath> for Manifest {
    fn from_iter<I: IntoIterator<Item = RelativePath>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(raw: &[&str]) -> Manifest {
        raw.iter().map(|p| RelativePath::new(*p).unwrap()).collect()
    }

    #[test]
    fn test_wire_format_is_sorted_json_array() {
        let manifest = paths(&["shared.js", "a.js"]);
        assert_eq!(manifest.to_bytes(), br#"["a.js","shared.js"]"#.to_vec());
    }

    #[test]
    fn test_decode_accepts_unsorted_input() {
        let manifest =
            Manifest::from_bytes(GenerationId::new(0), br#"["b.js","a.js","b.js"]"#).unwrap();
        assert_eq!(manifest, paths(&["a.js", "b.js"]));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Manifest::from_bytes(GenerationId::new(7), b"{not json").unwrap_err();
        assert!(matches!(
            err,
            ValpopError::MalformedManifest { generation, .. } if generation == GenerationId::new(7)
        ));
    }

    #[test]
    fn test_decode_rejects_escaping_paths() {
        let err = Manifest::from_bytes(GenerationId::new(7), br#"["../etc/passwd"]"#);
        assert!(err.is_err());
    }
}
