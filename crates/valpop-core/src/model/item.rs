use super::{GenerationId, Namespace, RelativePath};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one stored item: a file of one generation in one namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub namespace: Namespace,
    pub path: RelativePath,
    pub generation: GenerationId,
}

impl ItemKey {
    pub fn new(namespace: Namespace, path: RelativePath, generation: GenerationId) -> Self {
        Self {
            namespace,
            path,
            generation,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.generation, self.path)
    }
}
