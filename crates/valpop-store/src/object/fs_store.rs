//! Filesystem-backed object store
//!
//! Object keys map to files below a root directory, `/` separating
//! directories. Writes go through temp→rename; removal prunes directories
//! left empty.

use crate::atomic::{atomic_write, TEMP_SUFFIX};
use crate::errors::{as_adapter, backend_io, Result};
use crate::object::backend::ObjectBackend;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Remove now-empty directories from `dir` up to (not including) root.
    fn prune_empty_dirs(&self, mut dir: Option<&Path>) {
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }

    fn collect_keys(&self, dir: &Path, prefix: &str, keys: &mut Vec<String>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(backend_io("list_objects", prefix, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| backend_io("list_objects", prefix, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| backend_io("list_objects", prefix, e))?;
            let path = entry.path();
            if file_type.is_dir() {
                self.collect_keys(&path, prefix, keys)?;
            } else if let Some(key) = self.key_for(&path) {
                if !key.ends_with(TEMP_SUFFIX) && key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        Ok(())
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("/"))
    }
}

impl ObjectBackend for FsObjectStore {
    fn put_object(&self, key: &str, contents: &[u8]) -> Result<()> {
        atomic_write(&self.object_path(key), contents).map_err(|e| as_adapter("put_object", key, e))
    }

    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.object_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(backend_io("get_object", key, e)),
        }
    }

    fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        // Only the directory holding the prefix needs walking.
        let dir = match prefix.rsplit_once('/') {
            Some((dir, _)) => self.object_path(dir),
            None => self.root.clone(),
        };
        let mut keys = Vec::new();
        self.collect_keys(&dir, prefix, &mut keys)?;
        keys.sort();
        Ok(keys)
    }

    fn remove_object(&self, key: &str) -> Result<()> {
        let path = self.object_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(backend_io("remove_object", key, e)),
        }
        self.prune_empty_dirs(path.parent());
        Ok(())
    }
}
