//! Per-path age/count retention (key-value variant).
//!
//! For each relative path, independently: sort the generations holding it
//! newest first, keep the first `min_keep`, keep the rest only while they are
//! within `max_age_seconds`, and expire everything else.

use super::plan::DeletionPlan;
use super::policy::RetentionPolicy;
use crate::index::GenerationIndex;
use crate::model::{GenerationId, ItemKey, RelativePath};
use std::collections::BTreeMap;

/// Outcome of per-path evaluation. Generation lists are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerPathPlan {
    pub retained: BTreeMap<RelativePath, Vec<GenerationId>>,
    pub expired: BTreeMap<RelativePath, Vec<GenerationId>>,
}

impl PerPathPlan {
    /// Number of (path, generation) pairs marked for deletion.
    pub fn expired_count(&self) -> usize {
        self.expired.values().map(Vec::len).sum()
    }

    pub fn is_expired(&self, path: &str, generation: GenerationId) -> bool {
        self.expired
            .get(path)
            .is_some_and(|gens| gens.contains(&generation))
    }

    /// Lower into item deletions. Per-path retention never removes a
    /// generation record; the key-value variant has none once unlocked.
    pub fn into_deletion_plan(self, index: &GenerationIndex) -> DeletionPlan {
        let mut plan = DeletionPlan::new(index.namespace().clone());
        for (path, generations) in self.expired {
            for generation in generations {
                plan.items.push(ItemKey::new(
                    index.namespace().clone(),
                    path.clone(),
                    generation,
                ));
            }
        }
        plan
    }
}

/// Evaluate per-path retention against a visible listing.
pub fn evaluate_per_path(policy: &RetentionPolicy, now: i64, index: &GenerationIndex) -> PerPathPlan {
    let mut plan = PerPathPlan::default();

    for (path, mut generations) in index.generations_by_path() {
        generations.sort_unstable_by(|a, b| b.cmp(a));

        let mut retained = Vec::new();
        let mut expired = Vec::new();
        for (rank, generation) in generations.into_iter().enumerate() {
            if rank < policy.min_keep() || policy.within_max_age(generation, now) {
                retained.push(generation);
            } else {
                expired.push(generation);
            }
        }

        if !retained.is_empty() {
            plan.retained.insert(path.clone(), retained);
        }
        if !expired.is_empty() {
            plan.expired.insert(path.clone(), expired);
        }
    }

    plan
}
