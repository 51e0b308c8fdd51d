//! In-memory filesystem for testing.
//!
//! Provides [`MockFs`] for unit testing the loop driver without touching the
//! real filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{FsError, FsErrorKind, FsOperation};
use crate::filesystem::FileSystem;
use crate::path::normalize_lexically;

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// In-memory filesystem.
///
/// Files are stored by absolute path; directories exist implicitly when a
/// file lives under them, or explicitly via [`MockFs::with_dir`]. Every
/// mutating call is recorded and can be inspected with [`MockFs::calls`].
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use looper_fs::{FileSystem, MockFs};
///
/// let fs = MockFs::new()
///     .with_file("/src/index.html", "<html></html>")
///     .with_file("/src/css/site.css", "body {}");
///
/// let files = fs.scan(Path::new("/src")).unwrap();
/// assert_eq!(files.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockFs {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    calls: RwLock<Vec<(FsOperation, PathBuf)>>,
    failures: RwLock<Vec<(FsOperation, PathBuf)>>,
}

impl MockFs {
    /// Create a new empty mock filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Add an (empty) directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.write().unwrap().insert(path.into());
        self
    }

    /// Make `operation` fail with a permission error when applied to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, operation: FsOperation, path: impl Into<PathBuf>) -> Self {
        self.failures
            .write()
            .unwrap()
            .push((operation, path.into()));
        self
    }

    /// Current content of a file, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path.as_ref()).cloned()
    }

    /// Current content of a file as UTF-8 text, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned or the content is not UTF-8.
    #[must_use]
    pub fn text(&self, path: impl AsRef<Path>) -> Option<String> {
        self.content(path)
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    /// All file paths currently stored, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().unwrap().keys().cloned().collect()
    }

    /// Operations performed so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<(FsOperation, PathBuf)> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, operation: FsOperation, path: &Path) -> Result<(), FsError> {
        self.calls
            .write()
            .unwrap()
            .push((operation, path.to_path_buf()));
        let failing = self
            .failures
            .read()
            .unwrap()
            .iter()
            .any(|(op, p)| *op == operation && p == path);
        if failing {
            return Err(FsError::new(FsErrorKind::PermissionDenied, operation)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        let explicit = self.dirs.read().unwrap().iter().any(|d| d.starts_with(path));
        explicit
            || self
                .files
                .read()
                .unwrap()
                .keys()
                .any(|f| f != path && f.starts_with(path))
    }
}

impl FileSystem for MockFs {
    fn exists(&self, path: &Path) -> bool {
        let is_file = self.files.read().unwrap().contains_key(path);
        is_file || self.is_dir(path)
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, FsError> {
        Ok(normalize_lexically(path))
    }

    fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, FsError> {
        self.record(FsOperation::Scan, root)?;
        if !self.is_dir(root) {
            return Err(FsError::not_found(FsOperation::Scan, root).with_backend(BACKEND));
        }
        Ok(self
            .files
            .read()
            .unwrap()
            .keys()
            .filter(|p| p.starts_with(root))
            .cloned()
            .collect())
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.record(FsOperation::CopyTree, from)?;
        if !self.is_dir(from) {
            return Err(FsError::not_found(FsOperation::CopyTree, from).with_backend(BACKEND));
        }
        let mut files = self.files.write().unwrap();
        let copies: Vec<_> = files
            .iter()
            .filter_map(|(path, content)| {
                let rel = path.strip_prefix(from).ok()?;
                Some((to.join(rel), content.clone()))
            })
            .collect();
        files.extend(copies);
        self.dirs.write().unwrap().insert(to.to_path_buf());
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> Result<(), FsError> {
        self.record(FsOperation::RemoveTree, path)?;
        self.files
            .write()
            .unwrap()
            .retain(|p, _| !p.starts_with(path));
        self.dirs.write().unwrap().retain(|d| !d.starts_with(path));
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        self.record(FsOperation::Read, path)?;
        self.content(path)
            .ok_or_else(|| FsError::not_found(FsOperation::Read, path).with_backend(BACKEND))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<(), FsError> {
        self.record(FsOperation::Write, path)?;
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.record(FsOperation::Rename, from)?;
        let mut files = self.files.write().unwrap();
        let content = files
            .remove(from)
            .ok_or_else(|| FsError::not_found(FsOperation::Rename, from).with_backend(BACKEND))?;
        files.insert(to.to_path_buf(), content);
        Ok(())
    }
}
