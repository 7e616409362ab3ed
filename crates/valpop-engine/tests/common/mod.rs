//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use valpop_core::errors::{ExError, ExErrorKind};
use valpop_core::{Namespace, RelativePath, Result};
use valpop_store::{
    FsObjectStore, KvAdapter, KvBackend, ObjectBackend, ObjectStoreAdapter, SourceFile,
    SourceTree, SqliteKv,
};

pub fn ns(raw: &str) -> Namespace {
    Namespace::new(raw).unwrap()
}

pub fn p(raw: &str) -> RelativePath {
    RelativePath::new(raw).unwrap()
}

/// Write `files` below a fresh temp directory.
pub fn source_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp source directory");
    write_files(dir.path(), files);
    dir
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let target = root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(target, contents).unwrap();
    }
}

pub fn kv_store(dir: &TempDir) -> KvAdapter<SqliteKv> {
    KvAdapter::new(SqliteKv::open(dir.path().join("valpop.db")).unwrap())
}

pub fn object_store(dir: &TempDir) -> ObjectStoreAdapter<FsObjectStore> {
    ObjectStoreAdapter::new(FsObjectStore::new(dir.path().join("objects")))
}

fn injected(op: &str, key: &str) -> ExError {
    ExError::new(ExErrorKind::Adapter)
        .with_op(op)
        .with_path(key)
        .with_message("injected failure")
}

/// Key-value backend that fails selected primitives.
pub struct FailingKv {
    pub inner: SqliteKv,
    /// Fail `set` once this many calls have succeeded.
    pub fail_set_after: Cell<Option<usize>>,
    pub fail_delete: Cell<bool>,
    sets: Cell<usize>,
}

impl FailingKv {
    pub fn new() -> Self {
        Self {
            inner: SqliteKv::open_in_memory().unwrap(),
            fail_set_after: Cell::new(None),
            fail_delete: Cell::new(false),
            sets: Cell::new(0),
        }
    }
}

impl KvBackend for FailingKv {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if let Some(limit) = self.fail_set_after.get() {
            if self.sets.get() >= limit {
                return Err(injected("set", key));
            }
        }
        self.sets.set(self.sets.get() + 1);
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn delete_many(&self, keys: &[String]) -> Result<()> {
        if self.fail_delete.get() {
            return Err(injected("delete_many", keys.first().map_or("", String::as_str)));
        }
        self.inner.delete_many(keys)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.scan_prefix(prefix)
    }
}

/// Object backend that fails `remove_object` once a budget is used up.
pub struct FailingObjects {
    pub inner: FsObjectStore,
    pub removals_allowed: Cell<Option<usize>>,
}

impl FailingObjects {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: FsObjectStore::new(root),
            removals_allowed: Cell::new(None),
        }
    }
}

impl ObjectBackend for FailingObjects {
    fn put_object(&self, key: &str, contents: &[u8]) -> Result<()> {
        self.inner.put_object(key, contents)
    }

    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get_object(key)
    }

    fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list_objects(prefix)
    }

    fn remove_object(&self, key: &str) -> Result<()> {
        match self.removals_allowed.get() {
            Some(0) => Err(injected("remove_object", key)),
            Some(n) => {
                self.removals_allowed.set(Some(n - 1));
                self.inner.remove_object(key)
            }
            None => self.inner.remove_object(key),
        }
    }
}

/// Source that yields `good` files and then a traversal error.
pub struct BrokenSource {
    pub good: Vec<(&'static str, &'static str)>,
}

impl SourceTree for BrokenSource {
    fn walk(&self) -> Box<dyn Iterator<Item = Result<SourceFile>> + '_> {
        let files = self.good.iter().map(|(path, contents)| {
            Ok(SourceFile {
                path: p(path),
                contents: contents.as_bytes().to_vec(),
            })
        });
        let failure = std::iter::once(Err(ExError::new(ExErrorKind::Traversal)
            .with_op("walk_source")
            .with_path("unreadable/")
            .with_message("permission denied")));
        Box::new(files.chain(failure))
    }
}
