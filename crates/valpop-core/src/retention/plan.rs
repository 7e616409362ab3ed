use crate::model::{GenerationId, ItemKey, Namespace};

/// Backend-agnostic set of deletions produced by a retention evaluation.
///
/// The collector applies `items` first and `generations` second, so an
/// interrupted run leaves each remaining generation record describing
/// a generation whose items may already be gone, never the reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    pub namespace: Namespace,
    pub items: Vec<ItemKey>,
    /// Generation records (manifests) to remove after the items.
    pub generations: Vec<GenerationId>,
}

impl DeletionPlan {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            items: Vec::new(),
            generations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.generations.is_empty()
    }
}
