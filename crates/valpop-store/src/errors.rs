//! Error handling for valpop-store
//!
//! Wraps valpop-core ExError with store-specific helpers. Failures of a
//! backend primitive are `Adapter` errors; failures reading the source tree
//! are `Traversal` errors; failures writing the export destination are `Io`.

use valpop_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Backend rejected or failed an operation
pub fn adapter_error(op: &str, key: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Adapter)
        .with_op(op.to_string())
        .with_path(key.to_string())
        .with_message(message)
}

/// Create an adapter error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Adapter)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an adapter error from a filesystem failure inside a backend
pub fn backend_io(op: &str, key: &str, err: std::io::Error) -> ExError {
    adapter_error(op, key, err.to_string())
}

/// Create a traversal error for an unreadable source entry
pub fn traversal_error(path: &std::path::Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Traversal)
        .with_op("walk_source")
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Requested item or record does not exist
pub fn not_found(op: &str, key: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op.to_string())
        .with_path(key.to_string())
        .with_message("no such key")
}

/// Reclassify a lower-level failure inside a backend primitive as `Adapter`
pub fn as_adapter(op: &str, key: &str, err: ExError) -> ExError {
    ExError::new(ExErrorKind::Adapter)
        .with_op(op.to_string())
        .with_path(key.to_string())
        .with_message(err.message().to_string())
        .with_source(err)
}
