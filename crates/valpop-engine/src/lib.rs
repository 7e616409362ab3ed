//! valpop engine - Orchestration layer
//!
//! Drives publish, collection and retrieval over any `StorageAdapter`,
//! combining the retention engine from valpop-core with the backends from
//! valpop-store.

pub mod commands;

pub use commands::gc::{collect, GcOptions, GcReport};
pub use commands::publish::{populate, publish, PopulateReport, PublishReport};
pub use commands::retrieve::{export_all, select_and_export, ExportReport};
