//! Storage adapter seam
//!
//! One trait covers both backend variants. The engine drives publish,
//! collection and retrieval through it without knowing which variant sits
//! underneath; the variant only shows through [`StorageAdapter::retention_shape`].

use crate::errors::Result;
use crate::kv::{KvAdapter, SqliteKv};
use crate::object::{FsObjectStore, ObjectStoreAdapter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use valpop_core::errors::{ExError, ExErrorKind};
use valpop_core::{GenerationId, GenerationSource, ItemKey, Namespace, RelativePath, RetentionShape};

/// Backend operations needed to publish, list, retrieve and delete
/// generations.
///
/// Every method is synchronous and fails with an `Adapter` error when the
/// backend rejects or cannot perform the primitive.
pub trait StorageAdapter: GenerationSource {
    /// Retention shape matching how this backend stores items.
    fn retention_shape(&self) -> RetentionShape;

    /// Mark `generation` as in progress before any item is written.
    fn begin_generation(&self, namespace: &Namespace, generation: GenerationId) -> Result<()>;

    fn put_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        generation: GenerationId,
        contents: &[u8],
    ) -> Result<()>;

    /// Make `generation` visible. `paths` is every path written for it.
    fn end_generation(
        &self,
        namespace: &Namespace,
        generation: GenerationId,
        paths: &BTreeSet<RelativePath>,
    ) -> Result<()>;

    /// Items of every visible generation.
    fn list_items(&self, namespace: &Namespace) -> Result<Vec<ItemKey>> {
        Ok(self.list_generations(namespace)?.items())
    }

    fn get_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        generation: GenerationId,
    ) -> Result<Vec<u8>>;

    /// Delete items. Absent items are not an error.
    fn delete_items(&self, items: &[ItemKey]) -> Result<()>;

    /// Delete the record that makes `generation` visible, if the backend
    /// keeps one. Absent records are not an error.
    fn delete_generation(&self, namespace: &Namespace, generation: GenerationId) -> Result<()>;

    /// Namespaces holding at least one stored generation.
    fn list_namespaces(&self) -> Result<BTreeSet<Namespace>>;

    /// Remove generations whose publish started more than `stale_after`
    /// seconds before `now` and never finished. Returns what was removed.
    fn abandon_stale_generations(
        &self,
        _namespace: &Namespace,
        _now: i64,
        _stale_after: i64,
    ) -> Result<Vec<GenerationId>> {
        Ok(Vec::new())
    }
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for Box<T> {
    fn retention_shape(&self) -> RetentionShape {
        (**self).retention_shape()
    }

    fn begin_generation(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        (**self).begin_generation(namespace, generation)
    }

    fn put_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        generation: GenerationId,
        contents: &[u8],
    ) -> Result<()> {
        (**self).put_item(namespace, path, generation, contents)
    }

    fn end_generation(
        &self,
        namespace: &Namespace,
        generation: GenerationId,
        paths: &BTreeSet<RelativePath>,
    ) -> Result<()> {
        (**self).end_generation(namespace, generation, paths)
    }

    fn list_items(&self, namespace: &Namespace) -> Result<Vec<ItemKey>> {
        (**self).list_items(namespace)
    }

    fn get_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        generation: GenerationId,
    ) -> Result<Vec<u8>> {
        (**self).get_item(namespace, path, generation)
    }

    fn delete_items(&self, items: &[ItemKey]) -> Result<()> {
        (**self).delete_items(items)
    }

    fn delete_generation(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        (**self).delete_generation(namespace, generation)
    }

    fn list_namespaces(&self) -> Result<BTreeSet<Namespace>> {
        (**self).list_namespaces()
    }

    fn abandon_stale_generations(
        &self,
        namespace: &Namespace,
        now: i64,
        stale_after: i64,
    ) -> Result<Vec<GenerationId>> {
        (**self).abandon_stale_generations(namespace, now, stale_after)
    }
}

/// Which backend variant to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// SQLite-backed key-value store, lock keys gate visibility
    #[default]
    Kv,
    /// Filesystem object store, manifests gate visibility
    Object,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Kv => write!(f, "kv"),
            BackendKind::Object => write!(f, "object"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ExError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kv" => Ok(BackendKind::Kv),
            "object" => Ok(BackendKind::Object),
            other => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_backend")
                .with_message(format!("unknown backend '{}' (expected kv or object)", other))),
        }
    }
}

/// Open a backend at `address`: a SQLite database file for `Kv`, a root
/// directory for `Object`.
pub fn open(kind: BackendKind, address: &Path) -> Result<Box<dyn StorageAdapter>> {
    tracing::debug!(backend = %kind, address = %address.display(), "opening backend");
    match kind {
        BackendKind::Kv => Ok(Box::new(KvAdapter::new(SqliteKv::open(address)?))),
        BackendKind::Object => Ok(Box::new(ObjectStoreAdapter::new(FsObjectStore::new(
            address,
        )))),
    }
}
