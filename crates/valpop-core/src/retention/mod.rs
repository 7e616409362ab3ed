//! Retention policy engine.
//!
//! Decides, from a listing of visible generations, what may be deleted.
//! Two interchangeable shapes exist because the two backend variants store
//! items differently:
//!
//! - **Per-path** ([`per_path`]): every (path, generation) pair is its own
//!   object, so each path keeps its own newest versions plus anything young
//!   enough.
//! - **Reachability** ([`reachability`]): items are stored once per path and
//!   shared by every generation whose manifest lists them, so a path may only
//!   go once no retained generation references it.
//!
//! Every function here is pure: the same policy, clock reading and listing
//! always yield the same plan, and re-running against the listing left
//! behind by a completed collection yields an empty plan.

pub mod per_path;
pub mod plan;
pub mod policy;
pub mod reachability;

pub use per_path::{evaluate_per_path, PerPathPlan};
pub use plan::DeletionPlan;
pub use policy::{RetentionPolicy, RetentionShape, DEFAULT_PROTECTED_PATHS};
pub use reachability::{evaluate_reachability, ReachabilityPlan};

use crate::index::GenerationIndex;

/// Evaluate `policy` in the shape a backend needs and lower the result into
/// a backend-agnostic deletion plan.
pub fn plan_deletions(
    shape: RetentionShape,
    policy: &RetentionPolicy,
    now: i64,
    index: &GenerationIndex,
) -> DeletionPlan {
    match shape {
        RetentionShape::PerPath => evaluate_per_path(policy, now, index).into_deletion_plan(index),
        RetentionShape::Reachability => {
            evaluate_reachability(policy, now, index).into_deletion_plan(index)
        }
    }
}
