//! Filesystem trait consumed by the loop driver.
//!
//! All paths are absolute filesystem paths. Implementations are expected to
//! complete each operation before returning; there is no background I/O.

use std::path::{Path, PathBuf};

use crate::error::FsError;

/// Filesystem primitives needed to prepare a workspace and persist files.
pub trait FileSystem: Send + Sync {
    /// Check whether a path exists (file or directory).
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &Path) -> bool;

    /// Resolve `path` to the spelling used for identity comparisons.
    ///
    /// The result is absolute, free of `.` and `..` components, and follows
    /// symlinks as far as the path exists. Two spellings of the same
    /// location resolve to equal paths.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if the path can't be made absolute.
    fn resolve(&self, path: &Path) -> Result<PathBuf, FsError>;

    /// List every regular file under `root`, depth-first.
    ///
    /// Entries within a directory are visited in file-name order, and
    /// subdirectories are expanded in place.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if `root` does not exist or cannot be read.
    fn scan(&self, root: &Path) -> Result<Vec<PathBuf>, FsError>;

    /// Recursively copy the tree at `from` into `to`, creating `to` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if any directory or file cannot be copied.
    fn copy_tree(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Recursively remove the tree at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if the tree cannot be removed.
    fn remove_tree(&self, path: &Path) -> Result<(), FsError>;

    /// Read the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if the file doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Write `content` to a file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if the file can't be written.
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), FsError>;

    /// Rename a file.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if `from` doesn't exist or the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;
}
