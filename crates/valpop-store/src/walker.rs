//! Source tree walking
//!
//! Produces every regular file below a root with its path relative to that
//! root. Directories are descended depth-first with entries in name order.
//! Symlinks are followed when they point at a file and skipped when they
//! point at a directory.

use crate::errors::{traversal_error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use valpop_core::errors::{ExError, ExErrorKind};
use valpop_core::RelativePath;

/// One file read from a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: RelativePath,
    pub contents: Vec<u8>,
}

/// A tree of files to publish.
pub trait SourceTree {
    /// Start a fresh walk. The iterator stops after the first error.
    fn walk(&self) -> Box<dyn Iterator<Item = Result<SourceFile>> + '_>;
}

/// Walks a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirWalker {
    root: PathBuf,
}

impl DirWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceTree for DirWalker {
    fn walk(&self) -> Box<dyn Iterator<Item = Result<SourceFile>> + '_> {
        Box::new(Walk {
            root: &self.root,
            pending: vec![self.root.clone()],
            done: false,
        })
    }
}

struct Walk<'a> {
    root: &'a Path,
    /// Paths still to visit; the next one is at the end.
    pending: Vec<PathBuf>,
    done: bool,
}

impl Walk<'_> {
    fn next_file(&mut self) -> Option<Result<SourceFile>> {
        while let Some(path) = self.pending.pop() {
            // The root itself may be reached through a symlink.
            let meta = if path == self.root {
                fs::metadata(&path)
            } else {
                fs::symlink_metadata(&path)
            };
            let meta = match meta {
                Ok(meta) => meta,
                Err(e) => return Some(Err(traversal_error(&path, e))),
            };

            if meta.is_dir() {
                if let Err(err) = self.push_children(&path) {
                    return Some(Err(err));
                }
                continue;
            }

            if meta.file_type().is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_file() => {}
                    Ok(_) => continue,
                    Err(e) => return Some(Err(traversal_error(&path, e))),
                }
            } else if !meta.is_file() {
                continue;
            }

            return Some(self.read_file(&path));
        }
        None
    }

    fn push_children(&mut self, dir: &Path) -> Result<()> {
        let mut children = fs::read_dir(dir)
            .map_err(|e| traversal_error(dir, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| traversal_error(dir, e))?;
        children.sort();
        self.pending.extend(children.into_iter().rev());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<SourceFile> {
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        let relative = RelativePath::from_fs_path(relative).map_err(|e| {
            ExError::new(ExErrorKind::Traversal)
                .with_op("walk_source")
                .with_path(path.display().to_string())
                .with_message(e.to_string())
        })?;
        let contents = fs::read(path).map_err(|e| traversal_error(path, e))?;
        Ok(SourceFile {
            path: relative,
            contents,
        })
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.next_file();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths(walker: &DirWalker) -> Vec<String> {
        walker
            .walk()
            .map(|f| f.unwrap().path.to_string())
            .collect()
    }

    #[test]
    fn test_walk_yields_relative_paths_in_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("static/js")).unwrap();
        fs::write(dir.path().join("index.html"), b"<html>").unwrap();
        fs::write(dir.path().join("static/js/app.js"), b"app").unwrap();
        fs::write(dir.path().join("static/style.css"), b"css").unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let walker = DirWalker::new(dir.path());
        assert_eq!(
            paths(&walker),
            vec!["index.html", "static/js/app.js", "static/style.css"]
        );
    }

    #[test]
    fn test_walk_is_restartable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let walker = DirWalker::new(dir.path());
        assert_eq!(paths(&walker), paths(&walker));
    }

    #[test]
    fn test_walk_reads_contents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fedmods.json"), b"{}").unwrap();

        let files: Vec<SourceFile> = DirWalker::new(dir.path())
            .walk()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contents, b"{}");
    }

    #[test]
    fn test_missing_root_is_traversal_error_then_stops() {
        let dir = TempDir::new().unwrap();
        let walker = DirWalker::new(dir.path().join("nope"));
        let mut walk = walker.walk();

        let err = walk.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Traversal);
        assert!(walk.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_is_skipped() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"x").unwrap();
        fs::write(dir.path().join("real.txt"), b"y").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("alias.txt"))
            .unwrap();

        let walker = DirWalker::new(dir.path());
        assert_eq!(paths(&walker), vec!["alias.txt", "real.txt"]);
    }
}
