//! Retrieval: materialise one version of every path into a sink.

use super::in_command;
use std::collections::BTreeMap;
use valpop_core::selector::select;
use valpop_core::{
    log_op_end, log_op_error, log_op_start, GenerationId, Namespace, RelativePath, Result,
    SelectionRule,
};
use valpop_store::{Sink, StorageAdapter};

/// What one namespace export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub namespace: Namespace,
    /// Every path written with the generation it was read from.
    pub files: BTreeMap<RelativePath, GenerationId>,
}

/// Export one version of every visible path of `namespace` into `sink`.
///
/// ## Errors
///
/// - `Adapter`/`NotFound`: an item could not be read
/// - `Io`: the sink could not be written
pub fn select_and_export<A, K>(
    adapter: &A,
    namespace: &Namespace,
    sink: &K,
    rule: SelectionRule,
) -> Result<ExportReport>
where
    A: StorageAdapter + ?Sized,
    K: Sink + ?Sized,
{
    log_op_start!("export", namespace = namespace.as_str(), rule = ?rule);
    let start = std::time::Instant::now();

    let report = export_impl(adapter, namespace, sink, rule).map_err(|e| {
        let e = in_command(e, "export", namespace, None);
        log_op_error!(
            "export",
            &e,
            duration_ms = start.elapsed().as_millis() as u64,
            namespace = namespace.as_str()
        );
        e
    })?;

    log_op_end!(
        "export",
        duration_ms = start.elapsed().as_millis() as u64,
        namespace = namespace.as_str(),
        item_count = report.files.len() as u64
    );

    Ok(report)
}

fn export_impl<A, K>(
    adapter: &A,
    namespace: &Namespace,
    sink: &K,
    rule: SelectionRule,
) -> Result<ExportReport>
where
    A: StorageAdapter + ?Sized,
    K: Sink + ?Sized,
{
    let index = adapter.list_generations(namespace)?;
    let files = select(&index, rule);

    for (path, generation) in &files {
        let contents = adapter.get_item(namespace, path, *generation)?;
        sink.write(path, &contents)?;
    }

    Ok(ExportReport {
        namespace: namespace.clone(),
        files,
    })
}

/// Export every namespace the backend holds into the same sink, in
/// namespace order. A path present in several namespaces ends up with the
/// version from the last one.
///
/// ## Errors
///
/// Stops at the first namespace that fails; see [`select_and_export`].
pub fn export_all<A, K>(adapter: &A, sink: &K, rule: SelectionRule) -> Result<Vec<ExportReport>>
where
    A: StorageAdapter + ?Sized,
    K: Sink + ?Sized,
{
    adapter
        .list_namespaces()?
        .iter()
        .map(|namespace| select_and_export(adapter, namespace, sink, rule))
        .collect()
}
