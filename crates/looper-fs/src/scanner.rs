//! Recursive discovery of regular files.
//!
//! The scanner only lists file locations; no content is read at this stage.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FsError, FsOperation};

/// Discovers every regular file under a root directory.
///
/// Hidden files are included. Symlinks are followed without cycle
/// protection.
pub(crate) struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Create a new Scanner for `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Scan the tree and return absolute file paths, depth-first.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if the root does not exist or a directory can't
    /// be read.
    pub fn scan(&self) -> Result<Vec<PathBuf>, FsError> {
        let root = std::path::absolute(&self.root)
            .map_err(|e| FsError::io(e, FsOperation::Scan, &self.root))?;
        if !root.is_dir() {
            return Err(FsError::not_found(FsOperation::Scan, root));
        }

        let mut files = Vec::new();
        scan_directory(&root, &mut files)?;
        tracing::debug!(root = %root.display(), files = files.len(), "Scanned directory tree");
        Ok(files)
    }
}

/// Collect regular files in `dir`, recursing into subdirectories in place.
fn scan_directory(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), FsError> {
    let entries = fs::read_dir(dir).map_err(|e| FsError::io(e, FsOperation::Scan, dir))?;

    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FsError::io(e, FsOperation::Scan, dir))?;
    paths.sort();

    for path in paths {
        // Follows symlinks; dangling links are neither files nor dirs
        if path.is_dir() {
            scan_directory(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        } else {
            tracing::warn!(path = %path.display(), "Skipping entry that is neither a file nor a directory");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_scan_finds_files_depth_first() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir(root.join("b")).unwrap();
        fs::write(root.join("b/inner.css"), "b").unwrap();
        fs::create_dir(root.join("b/deep")).unwrap();
        fs::write(root.join("b/deep/x.html"), "x").unwrap();
        fs::write(root.join("c.md"), "c").unwrap();

        let files = Scanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(
            relative(root, &files),
            vec!["a.txt", "b/deep/x.html", "b/inner.css", "c.md"]
        );
    }

    #[test]
    fn test_scan_returns_absolute_paths() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("file.txt"), "").unwrap();

        let files = Scanner::new(temp_dir.path().to_path_buf()).scan().unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].is_absolute());
    }

    #[test]
    fn test_scan_includes_hidden_files() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join(".hidden"), "").unwrap();
        fs::create_dir(temp_dir.path().join(".config")).unwrap();
        fs::write(temp_dir.path().join(".config/settings.json"), "{}").unwrap();

        let files = Scanner::new(temp_dir.path().to_path_buf()).scan().unwrap();

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_scan_skips_empty_directories() {
        let temp_dir = create_test_dir();
        fs::create_dir_all(temp_dir.path().join("empty/nested")).unwrap();

        let files = Scanner::new(temp_dir.path().to_path_buf()).scan().unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_missing_dir() {
        let result = Scanner::new(PathBuf::from("/nonexistent/looper")).scan();

        let err = result.unwrap_err();
        assert_eq!(err.kind, crate::FsErrorKind::NotFound);
        assert_eq!(err.operation, FsOperation::Scan);
    }

    #[test]
    fn test_scan_root_is_file() {
        let temp_dir = create_test_dir();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "").unwrap();

        assert!(Scanner::new(file).scan().is_err());
    }
}
