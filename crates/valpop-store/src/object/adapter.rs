//! Storage adapter over an object backend

use crate::adapter::StorageAdapter;
use crate::errors::{not_found, Result};
use crate::object::backend::ObjectBackend;
use crate::object::keys;
use std::collections::BTreeSet;
use valpop_core::{
    ExError, GenerationId, GenerationIndex, GenerationSource, ItemKey, Manifest, Namespace,
    RelativePath, RetentionShape,
};

pub struct ObjectStoreAdapter<B> {
    backend: B,
}

impl<B: ObjectBackend> ObjectStoreAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn put_manifest(
        &self,
        namespace: &Namespace,
        generation: GenerationId,
        manifest: &Manifest,
    ) -> Result<()> {
        self.backend
            .put_object(&keys::manifest_key(namespace, generation), &manifest.to_bytes())
            .map_err(|e| e.with_namespace(namespace.as_str()).with_generation(generation))
    }

    /// Read a manifest; `None` when it does not exist.
    pub fn get_manifest(
        &self,
        namespace: &Namespace,
        generation: GenerationId,
    ) -> Result<Option<Manifest>> {
        match self
            .backend
            .get_object(&keys::manifest_key(namespace, generation))?
        {
            Some(bytes) => Ok(Some(Manifest::from_bytes(generation, &bytes).map_err(
                |e| ExError::from(e).with_namespace(namespace.as_str()),
            )?)),
            None => Ok(None),
        }
    }

    pub fn delete_manifest(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        self.backend
            .remove_object(&keys::manifest_key(namespace, generation))
    }

    /// Generations of `namespace` that have a manifest, ascending.
    pub fn list_manifests(&self, namespace: &Namespace) -> Result<Vec<GenerationId>> {
        let mut generations = self
            .backend
            .list_objects(&keys::manifest_prefix(namespace))?
            .iter()
            .map(|key| {
                keys::parse_manifest_key(key)
                    .map(|(_, generation)| generation)
                    .map_err(ExError::from)
            })
            .collect::<Result<Vec<_>>>()?;
        // Keys sort as strings; generations must sort as numbers.
        generations.sort();
        Ok(generations)
    }
}

impl<B: ObjectBackend> GenerationSource for ObjectStoreAdapter<B> {
    fn list_generations(&self, namespace: &Namespace) -> Result<GenerationIndex> {
        let mut index = GenerationIndex::new(namespace.clone());
        for generation in self.list_manifests(namespace)? {
            // A manifest removed between listing and reading is a generation
            // collected concurrently.
            if let Some(manifest) = self.get_manifest(namespace, generation)? {
                index.insert_generation(generation, manifest.into_paths());
            }
        }
        Ok(index)
    }
}

impl<B: ObjectBackend> StorageAdapter for ObjectStoreAdapter<B> {
    fn retention_shape(&self) -> RetentionShape {
        RetentionShape::Reachability
    }

    fn begin_generation(&self, _namespace: &Namespace, _generation: GenerationId) -> Result<()> {
        Ok(())
    }

    fn put_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        _generation: GenerationId,
        contents: &[u8],
    ) -> Result<()> {
        self.backend
            .put_object(&keys::data_key(namespace, path), contents)
    }

    fn end_generation(
        &self,
        namespace: &Namespace,
        generation: GenerationId,
        paths: &BTreeSet<RelativePath>,
    ) -> Result<()> {
        self.put_manifest(namespace, generation, &Manifest::new(paths.clone()))
    }

    /// Items are keyed by path alone; every generation reads the one stored
    /// object for `path`.
    fn get_item(
        &self,
        namespace: &Namespace,
        path: &RelativePath,
        _generation: GenerationId,
    ) -> Result<Vec<u8>> {
        let key = keys::data_key(namespace, path);
        self.backend
            .get_object(&key)?
            .ok_or_else(|| not_found("get_item", &key))
    }

    fn delete_items(&self, items: &[ItemKey]) -> Result<()> {
        let keys: BTreeSet<String> = items
            .iter()
            .map(|item| keys::data_key(&item.namespace, &item.path))
            .collect();
        for key in &keys {
            self.backend.remove_object(key)?;
        }
        Ok(())
    }

    fn delete_generation(&self, namespace: &Namespace, generation: GenerationId) -> Result<()> {
        self.delete_manifest(namespace, generation)
    }

    fn list_namespaces(&self) -> Result<BTreeSet<Namespace>> {
        let mut namespaces = BTreeSet::new();
        for key in self.backend.list_objects(keys::MANIFEST_ROOT)? {
            let (namespace, _) = keys::parse_manifest_key(&key)?;
            namespaces.insert(namespace);
        }
        Ok(namespaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::FsObjectStore;
    use tempfile::TempDir;
    use valpop_core::ExErrorKind;

    fn ns() -> Namespace {
        Namespace::new("app1").unwrap()
    }

    fn p(raw: &str) -> RelativePath {
        RelativePath::new(raw).unwrap()
    }

    #[test]
    fn test_manifest_gates_visibility() {
        let dir = TempDir::new().unwrap();
        let store = ObjectStoreAdapter::new(FsObjectStore::new(dir.path()));
        let generation = GenerationId::new(0);

        store.begin_generation(&ns(), generation).unwrap();
        store.put_item(&ns(), &p("a.js"), generation, b"a").unwrap();
        assert!(store.list_generations(&ns()).unwrap().is_empty());

        let paths: BTreeSet<_> = [p("a.js")].into_iter().collect();
        store.end_generation(&ns(), generation, &paths).unwrap();

        let index = store.list_generations(&ns()).unwrap();
        assert_eq!(index.paths(generation), Some(&paths));
    }

    #[test]
    fn test_manifests_sort_numerically() {
        let dir = TempDir::new().unwrap();
        let store = ObjectStoreAdapter::new(FsObjectStore::new(dir.path()));
        for seconds in [100, 9, 20] {
            store
                .put_manifest(&ns(), GenerationId::new(seconds), &Manifest::default())
                .unwrap();
        }

        let listed: Vec<i64> = store
            .list_manifests(&ns())
            .unwrap()
            .into_iter()
            .map(GenerationId::seconds)
            .collect();
        assert_eq!(listed, vec![9, 20, 100]);
    }

    #[test]
    fn test_corrupt_manifest_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let store = ObjectStoreAdapter::new(FsObjectStore::new(dir.path()));
        store
            .backend()
            .put_object("manifests/app1/5", b"{not json")
            .unwrap();

        let err = store.list_generations(&ns()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Decode);
        assert_eq!(err.generation(), Some(GenerationId::new(5)));
    }

    #[test]
    fn test_shared_item_read_by_any_generation() {
        let dir = TempDir::new().unwrap();
        let store = ObjectStoreAdapter::new(FsObjectStore::new(dir.path()));
        store
            .put_item(&ns(), &p("shared.js"), GenerationId::new(50), b"v50")
            .unwrap();

        assert_eq!(
            store
                .get_item(&ns(), &p("shared.js"), GenerationId::new(0))
                .unwrap(),
            b"v50"
        );
    }

    #[test]
    fn test_delete_manifest_twice_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = ObjectStoreAdapter::new(FsObjectStore::new(dir.path()));
        store
            .put_manifest(&ns(), GenerationId::new(1), &Manifest::default())
            .unwrap();

        store.delete_generation(&ns(), GenerationId::new(1)).unwrap();
        store.delete_generation(&ns(), GenerationId::new(1)).unwrap();

        assert!(store.get_manifest(&ns(), GenerationId::new(1)).unwrap().is_none());
        assert!(store.list_namespaces().unwrap().is_empty());
    }
}
