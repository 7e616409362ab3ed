//! Storage adapter over a key-value backend

use crate::adapter::StorageAdapter;
use crate::errors::{adapter_error, not_found, Result};
use crate::kv::backend::KvBackend;
use crate::kv::keys;
use std::collections::BTreeSet;
use valpop_core::{
    ExError, GenerationId, GenerationIndex, GenerationSource, ItemKey, Namespace, RelativePath,
    RetentionShape,
};

/// Value stored under a lock key while a publish runs.
pub const LOCK_VALUE: &[u8] = b"in-progress";

/// Tombstone left under the lock key of an abandoned publish. The generation
/// stays hidden for good and its late writes are swept on the next pass.
pub const ABANDONED_VALUE: &[u8] = b"abandoned";

pub struct KvAdapter<B> {
    backend: B,
}

impl<B: KvBackend> KvAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set_lock(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        self.backend
            .set(&keys::lock_key(namespace, generation), LOCK_VALUE)
            .map_err(|e| lock_context(e, "set_lock", namespace, generation))
    }

    /// Release the lock of a finished publish.
    ///
    /// Fails if the generation was abandoned in the meantime. A missing lock
    /// counts as already released.
    pub fn clear_lock(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        let key = keys::lock_key(namespace, generation);
        match self.backend.get(&key)? {
            Some(value) if value != LOCK_VALUE => {
                return Err(adapter_error(
                    "clear_lock",
                    &key,
                    "generation was abandoned before its publish finished",
                )
                .with_namespace(namespace.as_str())
                .with_generation(generation));
            }
            Some(_) => {}
            None => return Ok(()),
        }
        self.backend
            .delete_many(&[key])
            .map_err(|e| lock_context(e, "clear_lock", namespace, generation))
    }

    /// Whether a lock key, live or abandoned, hides `generation`.
    pub fn is_locked(&self, namespace: &Namespace, generation: GenerationId) -> Result<bool> {
        Ok(self
            .backend
            .get(&keys::lock_key(namespace, generation))?
            .is_some())
    }

    pub fn is_abandoned(&self, namespace: &Namespace, generation: GenerationId) -> Result<bool> {
        Ok(self
            .backend
            .get(&keys::lock_key(namespace, generation))?
            .is_some_and(|value| value == ABANDONED_VALUE))
    }

    /// Generations of `namespace` hidden behind a lock key.
    pub fn list_locks(&self, namespace: &Namespace) -> Result<BTreeSet<GenerationId>> {
        self.backend
            .scan_prefix(&keys::lock_prefix(namespace))?
            .iter()
            .map(|key| {
                keys::parse_lock_key(key)
                    .map(|(_, generation)| generation)
                    .map_err(ExError::from)
            })
            .collect()
    }

    /// Give up on publishes whose lock was taken more than `stale_after`
    /// seconds before `now`.
    ///
    /// The lock is turned into a tombstone before any item is deleted, so a
    /// publisher that is still running keeps writing into a hidden
    /// generation. Items written after an earlier pass are swept again, but
    /// only newly abandoned generations are returned.
    pub fn abandon_stale_locks(
        &self,
        namespace: &Namespace,
        now: i64,
        stale_after: i64,
    ) -> Result<Vec<GenerationId>> {
        let mut abandoned = Vec::new();
        for generation in self.list_locks(namespace)? {
            if generation.age_at(now) <= stale_after {
                continue;
            }
            let lock = keys::lock_key(namespace, generation);
            let newly_abandoned = match self.backend.get(&lock)? {
                Some(value) => value != ABANDONED_VALUE,
                // finished between the scan and now
                None => continue,
            };
            if newly_abandoned {
                self.backend
                    .set(&lock, ABANDONED_VALUE)
                    .map_err(|e| lock_context(e, "abandon_lock", namespace, generation))?;
            }
            let items = self
                .backend
                .scan_prefix(&keys::data_generation_prefix(namespace, generation))?;
            if !items.is_empty() {
                self.backend.delete_many(&items)?;
            }
            if newly_abandoned {
                tracing::warn!(
                    namespace = %namespace,
                    generation = generation.seconds(),
                    item_count = items.len(),
                    "abandoned stale publish"
                );
                abandoned.push(generation);
            }
        }
        Ok(abandoned)
    }
}

fn lock_context(
    err: ExError,
    op: &str,
    namespace: &Namespace,
    generation: GenerationId,
) -> ExError {
    err.in_op(op)
        .with_namespace(namespace.as_str())
        .with_generation(generation)
}

impl<B: KvBackend> GenerationSource for KvAdapter<B> {
    fn list_generations(&self, namespace: &Namespace) -> Result<GenerationIndex> {
        // Data before locks. A publish locks before its first write, so any
        // item scanned here has its lock in place by the time locks are read.
        let data = self.backend.scan_prefix(&keys::data_prefix(namespace))?;
        let locked = self.list_locks(namespace)?;
        let mut index = GenerationIndex::new(namespace.clone());
        for key in data {
            let (_, generation, path) = keys::parse_data_key(&key)?;
            if !locked.contains(&generation) {
                index.insert(generation, path);
            }
        }
        Ok(index)
    }
}

impl<B: KvBackend> StorageAdapter for KvAdapter<B> {
    fn retention_shape(&self) -> RetentionShape {
        RetentionShape::PerPath
    }

    fn begin_generation(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        self.set_lock(namespace, generation)
    }

    fn put_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        generation: GenerationId,
        contents: &[u8],
    ) -> Result<()> {
        self.backend
            .set(&keys::data_key(namespace, generation, path), contents)
    }

    fn end_generation(
        &self,
        namespace: &Namespace,
        generation: GenerationId,
        _paths: &BTreeSet<RelativePath>,
    ) -> Result<()> {
        self.clear_lock(namespace, generation)
    }

    fn get_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        generation: GenerationId,
    ) -> Result<Vec<u8>> {
        let key = keys::data_key(namespace, generation, path);
        self.backend
            .get(&key)?
            .ok_or_else(|| not_found("get_item", &key))
    }

    fn delete_items(&self, items: &[ItemKey]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = items
            .iter()
            .map(|item| keys::data_key(&item.namespace, item.generation, &item.path))
            .collect();
        self.backend.delete_many(&keys)
    }

    fn delete_generation(&self, _namespace: &Namespace, _generation: GenerationId) -> Result<()> {
        Ok(())
    }

    fn list_namespaces(&self) -> Result<BTreeSet<Namespace>> {
        let mut namespaces = BTreeSet::new();
        for key in self.backend.scan_prefix(&format!("{}:", keys::DATA_PREFIX))? {
            let (namespace, _, _) = keys::parse_data_key(&key)?;
            namespaces.insert(namespace);
        }
        Ok(namespaces)
    }

    fn abandon_stale_generations(
        &self,
        namespace: &Namespace,
        now: i64,
        stale_after: i64,
    ) -> Result<Vec<GenerationId>> {
        self.abandon_stale_locks(namespace, now, stale_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::SqliteKv;

    fn adapter() -> KvAdapter<SqliteKv> {
        KvAdapter::new(SqliteKv::open_in_memory().unwrap())
    }

    fn ns() -> Namespace {
        Namespace::new("app1").unwrap()
    }

    fn p(raw: &str) -> RelativePath {
        RelativePath::new(raw).unwrap()
    }

    #[test]
    fn test_locked_generation_is_hidden() {
        let kv = adapter();
        let generation = GenerationId::new(10);

        kv.begin_generation(&ns(), generation).unwrap();
        kv.put_item(&ns(), &p("index.html"), generation, b"<html>").unwrap();

        assert!(kv.is_locked(&ns(), generation).unwrap());
        assert!(kv.list_generations(&ns()).unwrap().is_empty());
        assert!(kv.list_items(&ns()).unwrap().is_empty());

        kv.end_generation(&ns(), generation, &BTreeSet::new()).unwrap();

        assert!(!kv.is_locked(&ns(), generation).unwrap());
        let index = kv.list_generations(&ns()).unwrap();
        assert!(index.contains(generation));
        assert_eq!(index.item_count(), 1);
    }

    #[test]
    fn test_get_missing_item_is_not_found() {
        let kv = adapter();
        let err = kv
            .get_item(&ns(), &p("missing.js"), GenerationId::new(0))
            .unwrap_err();
        assert_eq!(err.kind(), valpop_core::ExErrorKind::NotFound);
    }

    #[test]
    fn test_malformed_key_is_decode_error() {
        let kv = adapter();
        kv.backend().set("data:app1:soon:index.html", b"").unwrap();

        let err = kv.list_generations(&ns()).unwrap_err();
        assert_eq!(err.kind(), valpop_core::ExErrorKind::Decode);
    }

    #[test]
    fn test_list_namespaces() {
        let kv = adapter();
        let other = Namespace::new("app2").unwrap();
        kv.put_item(&ns(), &p("a"), GenerationId::new(0), b"").unwrap();
        kv.put_item(&other, &p("b"), GenerationId::new(0), b"").unwrap();
        kv.put_item(&ns(), &p("c"), GenerationId::new(1), b"").unwrap();

        let names: Vec<String> = kv
            .list_namespaces()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["app1", "app2"]);
    }

    #[test]
    fn test_abandon_stale_locks_only_past_threshold() {
        let kv = adapter();
        let stale = GenerationId::new(100);
        let fresh = GenerationId::new(950);

        for generation in [stale, fresh] {
            kv.begin_generation(&ns(), generation).unwrap();
            kv.put_item(&ns(), &p("index.html"), generation, b"x").unwrap();
        }

        let abandoned = kv.abandon_stale_locks(&ns(), 1000, 600).unwrap();

        assert_eq!(abandoned, vec![stale]);
        assert!(kv.is_abandoned(&ns(), stale).unwrap());
        assert!(!kv.is_abandoned(&ns(), fresh).unwrap());
        assert!(kv
            .backend()
            .scan_prefix(&keys::data_generation_prefix(&ns(), stale))
            .unwrap()
            .is_empty());
        assert_eq!(kv.list_locks(&ns()).unwrap().len(), 2);
    }

    #[test]
    fn test_late_writes_to_abandoned_generation_stay_hidden() {
        let kv = adapter();
        let slow = GenerationId::new(100);
        kv.begin_generation(&ns(), slow).unwrap();
        kv.put_item(&ns(), &p("a.js"), slow, b"a").unwrap();

        kv.abandon_stale_locks(&ns(), 1000, 600).unwrap();
        kv.put_item(&ns(), &p("b.js"), slow, b"b").unwrap();

        assert!(kv.list_generations(&ns()).unwrap().paths(slow).is_none());
        assert!(kv.list_items(&ns()).unwrap().is_empty());

        let err = kv.end_generation(&ns(), slow, &BTreeSet::new()).unwrap_err();
        assert_eq!(err.kind(), valpop_core::ExErrorKind::Adapter);
        assert!(kv.is_abandoned(&ns(), slow).unwrap());
        assert!(kv.list_generations(&ns()).unwrap().is_empty());
    }

    #[test]
    fn test_second_abandon_pass_sweeps_without_reporting() {
        let kv = adapter();
        let slow = GenerationId::new(100);
        kv.begin_generation(&ns(), slow).unwrap();
        assert_eq!(kv.abandon_stale_locks(&ns(), 1000, 600).unwrap(), vec![slow]);

        kv.put_item(&ns(), &p("late.js"), slow, b"late").unwrap();
        let again = kv.abandon_stale_locks(&ns(), 2000, 600).unwrap();

        assert!(again.is_empty());
        assert!(kv
            .backend()
            .scan_prefix(&keys::data_generation_prefix(&ns(), slow))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_end_without_lock_is_accepted() {
        let kv = adapter();
        kv.put_item(&ns(), &p("a.js"), GenerationId::new(3), b"a").unwrap();
        kv.end_generation(&ns(), GenerationId::new(3), &BTreeSet::new())
            .unwrap();
        assert!(kv.list_generations(&ns()).unwrap().contains(GenerationId::new(3)));
    }
}
