//! Garbage collection.
//!
//! ## Pipeline (in order):
//! 1. Abandon stale unfinished generations (when enabled)
//! 2. List visible generations
//! 3. Evaluate retention in the adapter's shape into a `DeletionPlan`
//! 4. `dry_run` short-circuit (no deletes)
//! 5. Delete items
//! 6. Delete generation records
//!
//! The first adapter error aborts the pass. Nothing already deleted is
//! restored; the next pass recomputes the plan from what is left.

use super::in_command;
use valpop_core::retention::plan_deletions;
use valpop_core::{
    log_op_end, log_op_error, log_op_start, Clock, DeletionPlan, GenerationId, Namespace,
    Result, RetentionPolicy, RetentionShape,
};
use valpop_store::StorageAdapter;

/// Options for a collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcOptions {
    /// Compute and report the plan without deleting anything.
    pub dry_run: bool,
    /// Abandon unfinished generations older than this many seconds.
    /// `None` leaves them alone.
    pub stale_lock_after_seconds: Option<i64>,
}

/// Outcome of a collection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcReport {
    pub namespace: Namespace,
    pub shape: RetentionShape,
    /// Clock reading the policy was evaluated at.
    pub now: i64,
    pub plan: DeletionPlan,
    pub dry_run: bool,
    pub items_deleted: usize,
    pub generations_deleted: usize,
    /// Unfinished generations removed before evaluation.
    pub abandoned: Vec<GenerationId>,
}

/// Run one collection pass over `namespace`.
///
/// ## Errors
///
/// - `Adapter`: a backend primitive failed; the pass stopped there
/// - `Decode`: a key or manifest could not be decoded while listing
pub fn collect<A, C>(
    adapter: &A,
    namespace: &Namespace,
    policy: &RetentionPolicy,
    clock: &C,
    options: GcOptions,
) -> Result<GcReport>
where
    A: StorageAdapter + ?Sized,
    C: Clock + ?Sized,
{
    log_op_start!(
        "collect",
        namespace = namespace.as_str(),
        dry_run = options.dry_run
    );
    let start = std::time::Instant::now();

    let report = collect_impl(adapter, namespace, policy, clock, options).map_err(|e| {
        let e = in_command(e, "collect", namespace, None);
        log_op_error!(
            "collect",
            &e,
            duration_ms = start.elapsed().as_millis() as u64,
            namespace = namespace.as_str()
        );
        e
    })?;

    log_op_end!(
        "collect",
        duration_ms = start.elapsed().as_millis() as u64,
        namespace = namespace.as_str(),
        item_count = report.items_deleted as u64,
        generation_count = report.generations_deleted as u64,
        abandoned_count = report.abandoned.len() as u64
    );

    Ok(report)
}

fn collect_impl<A, C>(
    adapter: &A,
    namespace: &Namespace,
    policy: &RetentionPolicy,
    clock: &C,
    options: GcOptions,
) -> Result<GcReport>
where
    A: StorageAdapter + ?Sized,
    C: Clock + ?Sized,
{
    let now = clock.now_seconds();
    let shape = adapter.retention_shape();

    let abandoned = match options.stale_lock_after_seconds {
        Some(stale_after) if !options.dry_run => {
            adapter.abandon_stale_generations(namespace, now, stale_after)?
        }
        _ => Vec::new(),
    };

    let index = adapter.list_generations(namespace)?;
    let plan = plan_deletions(shape, policy, now, &index);
    tracing::debug!(
        namespace = namespace.as_str(),
        generations = index.len(),
        planned_items = plan.items.len(),
        planned_generations = plan.generations.len(),
        "retention evaluated"
    );

    let mut report = GcReport {
        namespace: namespace.clone(),
        shape,
        now,
        plan,
        dry_run: options.dry_run,
        items_deleted: 0,
        generations_deleted: 0,
        abandoned,
    };

    if options.dry_run || report.plan.is_empty() {
        return Ok(report);
    }

    if !report.plan.items.is_empty() {
        adapter.delete_items(&report.plan.items)?;
        report.items_deleted = report.plan.items.len();
    }

    for generation in &report.plan.generations {
        adapter.delete_generation(namespace, *generation)?;
        report.generations_deleted += 1;
    }

    Ok(report)
}
