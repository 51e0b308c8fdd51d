//! Per-file descriptor handed to plugins.
//!
//! A [`FileDescriptor`] is built fresh for every file in every iteration,
//! threaded by `&mut` through the eligible plugins, and consumed when the
//! driver persists it.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use looper_document::{Document, is_recognized_extension};
use looper_fs::{FileSystem, FsError};

/// Which representation is written back to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Representation {
    /// The raw content buffer.
    #[default]
    Content,
    /// The serialized structured document, when one is present.
    Document,
}

/// Requested new name for a file, applied after all plugins ran.
///
/// Unset parts keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rename {
    /// New base name (without extension).
    pub file_name: Option<String>,
    /// New extension. A leading `.` is accepted.
    pub extension: Option<String>,
}

impl Rename {
    /// Rename request that changes nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new base name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the new extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }
}

/// A file being processed in one iteration.
///
/// Identity fields are fixed at construction and only exposed through
/// accessors. `content`, the document, `representation` and `rename` are
/// free for plugins to change.
#[derive(Debug)]
pub struct FileDescriptor {
    loop_number: usize,
    full_file_path: PathBuf,
    full_file_name: String,
    file_name: String,
    extension: String,
    /// Raw file content.
    pub content: Vec<u8>,
    document: Option<Document>,
    /// Representation persisted after all plugins ran.
    pub representation: Representation,
    /// Rename applied before persisting.
    pub rename: Option<Rename>,
}

impl FileDescriptor {
    /// Build a descriptor from a path and its content without touching the
    /// filesystem.
    ///
    /// HTML files get a parsed [`Document`]; markup that fails to parse is
    /// logged and leaves the document absent.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: Vec<u8>, loop_number: usize) -> Self {
        let full_file_path = path.into();
        let full_file_name = full_file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (file_name, extension) = split_file_name(&full_file_name);

        let document = if is_recognized_extension(&extension) {
            parse_document(&full_file_path, &content)
        } else {
            None
        };

        Self {
            loop_number,
            full_file_path,
            full_file_name,
            file_name,
            extension,
            content,
            document,
            representation: Representation::Content,
            rename: None,
        }
    }

    /// Read `path` through `fs` and build its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`FsError`] if the file can't be read.
    pub fn load(fs: &dyn FileSystem, path: &Path, loop_number: usize) -> Result<Self, FsError> {
        let content = fs.read(path)?;
        Ok(Self::new(path, content, loop_number))
    }

    /// 1-based iteration number.
    #[must_use]
    pub fn loop_number(&self) -> usize {
        self.loop_number
    }

    /// Absolute path of the file.
    #[must_use]
    pub fn full_file_path(&self) -> &Path {
        &self.full_file_path
    }

    /// Final path segment, e.g. `site.min.css`.
    #[must_use]
    pub fn full_file_name(&self) -> &str {
        &self.full_file_name
    }

    /// File name without the last extension, e.g. `site.min`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Text after the last `.`, e.g. `css`. Empty when the name has no `.`.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory containing the file.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.full_file_path.parent().unwrap_or(Path::new(""))
    }

    /// Content as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// Replace the content with `text`.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into().into_bytes();
    }

    /// Append `text` to the content.
    pub fn push_str(&mut self, text: &str) {
        self.content.extend_from_slice(text.as_bytes());
    }

    /// Structured view, present only for HTML files.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Mutable structured view.
    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    /// Persist the structured document instead of the content buffer.
    pub fn use_document(&mut self) {
        self.representation = Representation::Document;
    }

    /// Whether the document will be persisted.
    #[must_use]
    pub fn uses_document(&self) -> bool {
        self.representation == Representation::Document && self.document.is_some()
    }

    /// Bytes to write back: the serialized document when selected and
    /// present, the content buffer otherwise.
    #[must_use]
    pub fn persisted_bytes(&self) -> Cow<'_, [u8]> {
        match (&self.representation, &self.document) {
            (Representation::Document, Some(document)) => {
                Cow::Owned(document.to_html().into_bytes())
            }
            _ => Cow::Borrowed(&self.content),
        }
    }

    /// Target path of the requested rename, if one was requested.
    ///
    /// The base name and extension default to the current ones, and an empty
    /// requested part counts as unset. A requested extension starting with
    /// `.` gets no second dot, and an empty effective extension produces no
    /// trailing dot.
    #[must_use]
    pub fn renamed_path(&self) -> Option<PathBuf> {
        let rename = self.rename.as_ref()?;
        let file_name = rename
            .file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.file_name);
        let extension = match rename.extension.as_deref().filter(|ext| !ext.is_empty()) {
            Some(extension) => extension.strip_prefix('.').unwrap_or(extension),
            None => &self.extension,
        };

        let full_file_name = if extension.is_empty() {
            file_name.to_owned()
        } else {
            format!("{file_name}.{extension}")
        };
        Some(self.directory().join(full_file_name))
    }
}

/// Split a full file name into base name and extension at the last `.`.
///
/// A name without any dot is treated as all base name: `Makefile` has base
/// name `Makefile` and an empty extension, never the reverse.
fn split_file_name(full_file_name: &str) -> (String, String) {
    match full_file_name.rsplit_once('.') {
        Some((name, extension)) => (name.to_owned(), extension.to_owned()),
        None => (full_file_name.to_owned(), String::new()),
    }
}

fn parse_document(path: &Path, content: &[u8]) -> Option<Document> {
    let Ok(html) = std::str::from_utf8(content) else {
        tracing::warn!(path = %path.display(), "HTML file is not valid UTF-8, skipping document view");
        return None;
    };
    match Document::parse(html) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse HTML document");
            None
        }
    }
}
