//! Lifecycle logging macros
//!
//! Every engine command emits exactly one `start` and then either one `end`
//! or one `end_error`, all tagged with `component`, `op` and `event`.
//! Expansion refers to `valpop_core_types`, so callers depend on it too.

/// Log that a command started.
///
/// ```
/// # use valpop_core::log_op_start;
/// log_op_start!("populate");
/// log_op_start!("publish", namespace = "app1", generation = 1_700_000_000i64);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = valpop_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = valpop_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log that a command finished. `duration_ms` comes first.
///
/// ```
/// # use valpop_core::log_op_end;
/// log_op_end!(
///     "collect",
///     duration_ms = 3u64,
///     namespace = "app1",
///     item_count = 1u64,
///     generation_count = 1u64
/// );
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = valpop_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = valpop_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log that a command failed, with the error's kind, stable code and text.
///
/// ```
/// # use valpop_core::log_op_error;
/// # use valpop_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Traversal)
///     .with_op("walk")
///     .with_path("static/broken.js");
/// log_op_error!("publish", &err, duration_ms = 10u64, namespace = "app1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let failure: &$crate::errors::ExError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = valpop_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?failure.kind(),
            err.code = failure.code(),
            error = %failure,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let failure: &$crate::errors::ExError = $err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = valpop_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?failure.kind(),
            err.code = failure.code(),
            error = %failure,
            $($field)*
        );
    }};
}
