//! valpop store - backend adapters and local filesystem plumbing
//!
//! Provides:
//! - The `StorageAdapter` trait every publish, collection and retrieval goes
//!   through
//! - A key-value variant on SQLite, where lock keys gate visibility
//! - An object-store variant on a local directory, where manifests gate
//!   visibility
//! - The source tree walker and export sink

pub mod adapter;
pub mod atomic;
pub mod errors;
pub mod kv;
pub mod object;
pub mod sink;
pub mod walker;

// Re-export key types
pub use adapter::{open, BackendKind, StorageAdapter};
pub use errors::Result;
pub use kv::{KvAdapter, KvBackend, SqliteKv};
pub use object::{FsObjectStore, ObjectBackend, ObjectStoreAdapter};
pub use sink::{DirSink, Sink};
pub use walker::{DirWalker, SourceFile, SourceTree};
