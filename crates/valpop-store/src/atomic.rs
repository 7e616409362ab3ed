//! Atomic write primitives
//!
//! Uses temp→rename so readers never observe a partially written file.

use crate::errors::{io_error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of in-flight temp files; listings skip names ending with it.
pub const TEMP_SUFFIX: &str = ".valpop-tmp";

/// Path of the temp file used while writing `target_path`.
pub fn temp_path_for(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    target_path.with_file_name(name)
}

/// Atomically write bytes to a file, creating parent directories
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_parent_dir", e))?;
    }

    let temp_path = temp_path_for(target_path);
    fs::write(&temp_path, content).map_err(|e| io_error("write_temp", e))?;
    fs::rename(&temp_path, target_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        io_error("rename_temp", e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("test.txt");

        atomic_write(&target, b"hello").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"hello");
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("subdir").join("test.txt");

        atomic_write(&target, b"nested").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"nested");
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("index.html");

        atomic_write(&target, b"v1").unwrap();
        atomic_write(&target, b"v2").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"v2");
    }

    #[test]
    fn test_temp_name_keeps_extension_distinct() {
        let temp = temp_path_for(Path::new("/x/app.js"));
        assert_eq!(temp, PathBuf::from("/x/app.js.valpop-tmp"));
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        atomic_write(&temp_dir.path().join("test.txt"), b"clean").unwrap();

        let tmp_count = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|s| s.ends_with(TEMP_SUFFIX))
                    .unwrap_or(false)
            })
            .count();

        assert_eq!(tmp_count, 0);
    }
}
