//! Filesystem error type.
//!
//! [`FsError`] carries a semantic [`FsErrorKind`], the operation that failed,
//! the path involved and the underlying source error.

use std::path::PathBuf;

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FsErrorKind {
    /// Path does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Target already exists.
    AlreadyExists,
    /// Path is not of the expected type (e.g. a file where a directory was expected).
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

/// Filesystem operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    Scan,
    Read,
    Write,
    Rename,
    CopyTree,
    RemoveTree,
    Resolve,
}

impl FsOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Read => "read",
            Self::Write => "write",
            Self::Rename => "rename",
            Self::CopyTree => "copy",
            Self::RemoveTree => "remove",
            Self::Resolve => "resolve",
        }
    }
}

/// Filesystem error with semantic kind, operation and path context.
#[derive(Debug)]
pub struct FsError {
    /// Semantic error category.
    pub kind: FsErrorKind,
    /// Operation that failed.
    pub operation: FsOperation,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Local", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FsError {
    /// Create a new filesystem error.
    #[must_use]
    pub fn new(kind: FsErrorKind, operation: FsOperation) -> Self {
        Self {
            kind,
            operation,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(operation: FsOperation, path: impl Into<PathBuf>) -> Self {
        Self::new(FsErrorKind::NotFound, operation).with_path(path)
    }

    /// Create a filesystem error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, operation: FsOperation, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => FsErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => FsErrorKind::AlreadyExists,
            std::io::ErrorKind::NotADirectory | std::io::ErrorKind::IsADirectory => {
                FsErrorKind::InvalidPath
            }
            _ => FsErrorKind::Other,
        };
        Self::new(kind, operation).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] read failed: Not found: <source> (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            FsErrorKind::NotFound => "Not found",
            FsErrorKind::PermissionDenied => "Permission denied",
            FsErrorKind::AlreadyExists => "Already exists",
            FsErrorKind::InvalidPath => "Invalid path",
            FsErrorKind::Other => "Error",
        };

        write!(f, "{} failed: {kind_str}", self.operation.as_str())?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
