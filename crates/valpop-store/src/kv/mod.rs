//! Key-value backend variant
//!
//! Every (path, generation) pair is stored under its own key. A generation is
//! hidden while its lock key exists; publishing sets the lock first and
//! clears it last. An abandoned publish keeps its lock key as a tombstone.

pub mod adapter;
pub mod backend;
pub mod keys;
pub mod sqlite;

pub use adapter::{KvAdapter, ABANDONED_VALUE, LOCK_VALUE};
pub use backend::KvBackend;
pub use sqlite::SqliteKv;
