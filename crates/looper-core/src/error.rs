//! Errors returned by the loop driver.

use std::path::PathBuf;

use looper_fs::FsError;

use crate::plugin::PluginError;

/// Error returned by [`Looper::run`](crate::Looper::run).
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// Source directory is missing or isn't a directory.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Invalid driver or run-request settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Workspace preparation, scan, read, rename or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] FsError),

    /// A plugin returned an error. The run stops at the first failure.
    #[error("Plugin {plugin} (position {position}) failed on {}", .path.display())]
    Plugin {
        /// Plugin id, or `#<position>` when it has none.
        plugin: String,
        /// Zero-based registration position.
        position: usize,
        /// File being processed.
        path: PathBuf,
        /// Error returned by the plugin.
        #[source]
        source: PluginError,
    },
}
