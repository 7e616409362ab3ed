//! Export destinations

use crate::atomic::atomic_write;
use crate::errors::Result;
use std::path::{Path, PathBuf};
use valpop_core::RelativePath;

/// Destination retrieved files are written to.
pub trait Sink {
    /// Write `contents` at `path`, creating parents and replacing any
    /// existing file.
    fn write(&self, path: &RelativePath, contents: &[u8]) -> Result<()>;
}

/// Writes files below a local directory.
#[derive(Debug, Clone)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, path: &RelativePath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |target, segment| target.join(segment))
    }
}

impl Sink for DirSink {
    fn write(&self, path: &RelativePath, contents: &[u8]) -> Result<()> {
        atomic_write(&self.target(path), contents).map_err(|e| e.with_path(path.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = DirSink::new(dir.path().join("out"));
        let path = RelativePath::new("static/js/app.js").unwrap();

        sink.write(&path, b"v1").unwrap();
        sink.write(&path, b"v2").unwrap();

        assert_eq!(
            fs::read(dir.path().join("out/static/js/app.js")).unwrap(),
            b"v2"
        );
    }

    #[test]
    fn test_write_over_directory_fails_with_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("index.html")).unwrap();
        let sink = DirSink::new(dir.path());

        let err = sink
            .write(&RelativePath::new("index.html").unwrap(), b"x")
            .unwrap_err();
        assert_eq!(err.kind(), valpop_core::ExErrorKind::Io);
        assert_eq!(err.path(), Some("index.html"));
    }
}
