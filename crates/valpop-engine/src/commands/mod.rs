//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for every command:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()`/`warn!()` for
//! internal details.

pub mod gc;
pub mod publish;
pub mod retrieve;

use valpop_core::{ExError, GenerationId, Namespace};

/// Tag an error with the running command and its namespace, keeping the
/// failing primitive as source.
pub(crate) fn in_command(
    err: ExError,
    op: &str,
    namespace: &Namespace,
    generation: Option<GenerationId>,
) -> ExError {
    let err = err.in_op(op).with_namespace(namespace.as_str());
    match generation {
        Some(generation) => err.with_generation(generation),
        None => err,
    }
}
