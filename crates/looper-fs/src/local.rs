//! Local filesystem implementation of [`FileSystem`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsOperation};
use crate::filesystem::FileSystem;
use crate::path::normalize_lexically;
use crate::scanner::Scanner;

/// Backend identifier for error messages.
const BACKEND: &str = "Local";

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new local filesystem handle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn io_error(err: std::io::Error, operation: FsOperation, path: &Path) -> FsError {
    FsError::io(err, operation, path).with_backend(BACKEND)
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, FsError> {
        let absolute =
            std::path::absolute(path).map_err(|e| io_error(e, FsOperation::Resolve, path))?;
        if let Ok(canonical) = fs::canonicalize(&absolute) {
            return Ok(canonical);
        }

        // Canonicalize the nearest existing ancestor and re-attach the rest
        let normalized = normalize_lexically(&absolute);
        let mut existing = normalized.as_path();
        let mut missing = Vec::new();
        while let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) {
            missing.push(name);
            existing = parent;
            if let Ok(mut resolved) = fs::canonicalize(existing) {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
        }
        Ok(normalized)
    }

    fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, FsError> {
        Scanner::new(root.to_path_buf())
            .scan()
            .map_err(|e| e.with_backend(BACKEND))
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        if !from.is_dir() {
            return Err(FsError::not_found(FsOperation::CopyTree, from).with_backend(BACKEND));
        }
        copy_dir(from, to)
    }

    fn remove_tree(&self, path: &Path) -> Result<(), FsError> {
        let result = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| io_error(e, FsOperation::RemoveTree, path))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        fs::read(path).map_err(|e| io_error(e, FsOperation::Read, path))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<(), FsError> {
        fs::write(path, content).map_err(|e| io_error(e, FsOperation::Write, path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).map_err(|e| io_error(e, FsOperation::Rename, from))
    }
}

/// Copy the directory tree at `from` into `to`.
fn copy_dir(from: &Path, to: &Path) -> Result<(), FsError> {
    fs::create_dir_all(to).map_err(|e| io_error(e, FsOperation::CopyTree, to))?;

    let entries = fs::read_dir(from).map_err(|e| io_error(e, FsOperation::CopyTree, from))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_error(e, FsOperation::CopyTree, from))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        if source.is_dir() {
            copy_dir(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(|e| io_error(e, FsOperation::CopyTree, &source))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsErrorKind;

    #[test]
    fn test_copy_tree_duplicates_nested_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(src.join("css/vendor")).unwrap();
        fs::write(src.join("index.html"), "<html></html>").unwrap();
        fs::write(src.join("css/vendor/reset.css"), "* {}").unwrap();
        let dist = temp_dir.path().join("dist");

        LocalFs::new().copy_tree(&src, &dist).unwrap();

        assert_eq!(
            fs::read_to_string(dist.join("index.html")).unwrap(),
            "<html></html>"
        );
        assert_eq!(
            fs::read_to_string(dist.join("css/vendor/reset.css")).unwrap(),
            "* {}"
        );
        assert!(src.join("index.html").exists());
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = LocalFs::new()
            .copy_tree(&temp_dir.path().join("missing"), &temp_dir.path().join("out"))
            .unwrap_err();

        assert_eq!(err.kind, FsErrorKind::NotFound);
        assert_eq!(err.operation, FsOperation::CopyTree);
    }

    #[test]
    fn test_resolve_folds_parent_components() {
        let temp_dir = tempfile::tempdir().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let fs_handle = LocalFs::new();

        let direct = fs_handle.resolve(&src).unwrap();
        let detour = fs_handle
            .resolve(&temp_dir.path().join("missing/../src"))
            .unwrap();

        assert_eq!(direct, fs::canonicalize(&src).unwrap());
        assert_eq!(detour, direct);
    }

    #[test]
    fn test_resolve_missing_path_keeps_missing_tail() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();

        let resolved = LocalFs::new()
            .resolve(&temp_dir.path().join("a/./b/../dist"))
            .unwrap();

        assert_eq!(resolved, root.join("a/dist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let src = temp_dir.path().join("src");
        let link = temp_dir.path().join("link");
        fs::create_dir_all(&src).unwrap();
        std::os::unix::fs::symlink(&src, &link).unwrap();
        let fs_handle = LocalFs::new();

        assert_eq!(
            fs_handle.resolve(&link).unwrap(),
            fs_handle.resolve(&src).unwrap()
        );
        assert_eq!(
            fs_handle.resolve(&link.join("dist")).unwrap(),
            fs_handle.resolve(&src).unwrap().join("dist")
        );
    }

    #[test]
    fn test_remove_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dist = temp_dir.path().join("dist");
        fs::create_dir_all(dist.join("nested")).unwrap();
        fs::write(dist.join("nested/file.txt"), "x").unwrap();

        LocalFs::new().remove_tree(&dist).unwrap();

        assert!(!dist.exists());
    }

    #[test]
    fn test_read_write_rename() {
        let temp_dir = tempfile::tempdir().unwrap();
        let fs_handle = LocalFs::new();
        let path = temp_dir.path().join("b.css");
        let renamed = temp_dir.path().join("foo.min.css");

        fs_handle.write(&path, b"body {}").unwrap();
        assert_eq!(fs_handle.read(&path).unwrap(), b"body {}");

        fs_handle.rename(&path, &renamed).unwrap();
        assert!(!fs_handle.exists(&path));
        assert_eq!(fs_handle.read(&renamed).unwrap(), b"body {}");
    }

    #[test]
    fn test_read_missing_file() {
        let err = LocalFs::new()
            .read(Path::new("/nonexistent/looper/file.txt"))
            .unwrap_err();

        assert_eq!(err.kind, FsErrorKind::NotFound);
        assert_eq!(err.backend, Some("Local"));
    }
}
