//! Snapshot publishing.
//!
//! A publish is one new generation, named by the clock reading taken when it
//! starts. The generation stays invisible to listings until every file has
//! been written and `end_generation` succeeds. A failed publish leaves its
//! written items behind, still invisible.

use super::gc::{collect, GcOptions, GcReport};
use super::in_command;
use std::collections::BTreeSet;
use valpop_core::{
    log_op_end, log_op_error, log_op_start, Clock, GenerationId, Namespace, RelativePath, Result,
    RetentionPolicy,
};
use valpop_store::{SourceTree, StorageAdapter};

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub namespace: Namespace,
    pub generation: GenerationId,
    /// Every path written, which is also the generation's manifest.
    pub paths: BTreeSet<RelativePath>,
}

/// Result of publish followed by collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateReport {
    pub publish: PublishReport,
    pub gc: GcReport,
}

/// Publish every file of `source` as a new generation of `namespace`.
///
/// ## Errors
///
/// - `Traversal`: the source tree could not be read; the walk stopped there
/// - `Adapter`: a backend write failed
pub fn publish<A, S, C>(
    adapter: &A,
    namespace: &Namespace,
    source: &S,
    clock: &C,
) -> Result<PublishReport>
where
    A: StorageAdapter + ?Sized,
    S: SourceTree + ?Sized,
    C: Clock + ?Sized,
{
    let generation = GenerationId::new(clock.now_seconds());
    log_op_start!(
        "publish",
        namespace = namespace.as_str(),
        generation = generation.seconds()
    );
    let start = std::time::Instant::now();

    let report = publish_impl(adapter, namespace, source, generation).map_err(|e| {
        let e = in_command(e, "publish", namespace, Some(generation));
        log_op_error!(
            "publish",
            &e,
            duration_ms = start.elapsed().as_millis() as u64,
            namespace = namespace.as_str(),
            generation = generation.seconds()
        );
        e
    })?;

    log_op_end!(
        "publish",
        duration_ms = start.elapsed().as_millis() as u64,
        namespace = namespace.as_str(),
        generation = generation.seconds(),
        item_count = report.paths.len() as u64
    );

    Ok(report)
}

fn publish_impl<A, S>(
    adapter: &A,
    namespace: &Namespace,
    source: &S,
    generation: GenerationId,
) -> Result<PublishReport>
where
    A: StorageAdapter + ?Sized,
    S: SourceTree + ?Sized,
{
    adapter.begin_generation(namespace, generation)?;

    let mut paths = BTreeSet::new();
    for file in source.walk() {
        let file = file?;
        adapter.put_item(namespace, &file.path, generation, &file.contents)?;
        tracing::debug!(
            namespace = namespace.as_str(),
            generation = generation.seconds(),
            path = file.path.as_str(),
            bytes = file.contents.len(),
            "item written"
        );
        paths.insert(file.path);
    }

    adapter.end_generation(namespace, generation, &paths)?;

    Ok(PublishReport {
        namespace: namespace.clone(),
        generation,
        paths,
    })
}

/// Publish `source`, then collect `namespace` under `policy`.
///
/// `policy` is already validated, so a bad retention setting can never get
/// as far as touching the backend.
///
/// ## Errors
///
/// Anything [`publish`] or [`collect`] returns. A collection failure leaves
/// the new generation published.
pub fn populate<A, S, C>(
    adapter: &A,
    namespace: &Namespace,
    source: &S,
    policy: &RetentionPolicy,
    clock: &C,
    options: GcOptions,
) -> Result<PopulateReport>
where
    A: StorageAdapter + ?Sized,
    S: SourceTree + ?Sized,
    C: Clock + ?Sized,
{
    let publish = publish(adapter, namespace, source, clock)?;
    let gc = collect(adapter, namespace, policy, clock, options)?;
    Ok(PopulateReport { publish, gc })
}
