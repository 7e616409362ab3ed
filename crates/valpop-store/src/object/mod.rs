//! Object-store backend variant
//!
//! Items are stored once per path and shared by every generation whose
//! manifest lists them. A generation exists for readers only once its
//! manifest object has been written.

pub mod adapter;
pub mod backend;
pub mod fs_store;
pub mod keys;

pub use adapter::ObjectStoreAdapter;
pub use backend::ObjectBackend;
pub use fs_store::FsObjectStore;
