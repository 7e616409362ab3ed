//! Per-generation reachability retention (object-store variant).
//!
//! Generations are ranked newest first. A generation is retained while its
//! rank is below `min_keep` or it is within `max_age_seconds`; otherwise it
//! is expired. A path is deleted only when some expired generation lists it,
//! no retained generation lists it, and it is not protected.

use super::plan::DeletionPlan;
use super::policy::RetentionPolicy;
use crate::index::GenerationIndex;
use crate::model::{GenerationId, ItemKey, RelativePath};
use std::collections::BTreeSet;

/// Outcome of reachability evaluation. Generation lists are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityPlan {
    pub retained: Vec<GenerationId>,
    pub expired: Vec<GenerationId>,
    /// Union of the paths of retained generations.
    pub reachable: BTreeSet<RelativePath>,
    /// Union of the paths of expired generations.
    pub candidates: BTreeSet<RelativePath>,
    /// `candidates - reachable - protected`
    pub paths_to_delete: BTreeSet<RelativePath>,
}

impl ReachabilityPlan {
    pub fn generations_to_delete(&self) -> &[GenerationId] {
        &self.expired
    }

    /// Lower into item and manifest deletions.
    ///
    /// Items in this variant are keyed by path alone; each deleted path is
    /// paired with the newest expired generation that lists it so the key
    /// still names a real (path, generation) pair.
    pub fn into_deletion_plan(self, index: &GenerationIndex) -> DeletionPlan {
        let mut plan = DeletionPlan::new(index.namespace().clone());

        for path in &self.paths_to_delete {
            let owner = self
                .expired
                .iter()
                .copied()
                .find(|g| index.paths(*g).is_some_and(|paths| paths.contains(path)));
            if let Some(generation) = owner {
                plan.items.push(ItemKey::new(
                    index.namespace().clone(),
                    path.clone(),
                    generation,
                ));
            }
        }
        plan.generations = self.expired;
        plan
    }
}

/// Evaluate reachability retention against a visible listing.
pub fn evaluate_reachability(
    policy: &RetentionPolicy,
    now: i64,
    index: &GenerationIndex,
) -> ReachabilityPlan {
    let mut plan = ReachabilityPlan::default();

    for (rank, (generation, paths)) in index.newest_first().enumerate() {
        if rank < policy.min_keep() || policy.within_max_age(generation, now) {
            plan.retained.push(generation);
            plan.reachable.extend(paths.iter().cloned());
        } else {
            plan.expired.push(generation);
            plan.candidates.extend(paths.iter().cloned());
        }
    }

    plan.paths_to_delete = plan
        .candidates
        .iter()
        .filter(|path| !plan.reachable.contains(*path))
        .filter(|path| !policy.is_protected(path.as_str()))
        .cloned()
        .collect();

    plan
}
