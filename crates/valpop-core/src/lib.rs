//! valpop core - model, visibility index and retention engine
//!
//! This crate holds everything about publishing and retiring asset
//! generations that does not touch a backend:
//! - Namespace / generation / path / manifest model types
//! - The generation index every listing is expressed as
//! - The retention policy engine (per-path and reachability shapes)
//! - The retrieval selector
//! - Error and logging facilities shared by the rest of the workspace

pub mod errors;
pub mod index;
pub mod logging_facility;
pub mod model;
pub mod retention;
pub mod selector;
pub mod time;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, ValpopError};
pub use index::{GenerationIndex, GenerationSource};
pub use model::{GenerationId, ItemKey, Manifest, Namespace, RelativePath};
pub use retention::{DeletionPlan, RetentionPolicy, RetentionShape};
pub use selector::SelectionRule;
pub use time::{Clock, FixedClock, SystemClock};
