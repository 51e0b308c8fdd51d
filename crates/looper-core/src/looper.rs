//! Loop driver.
//!
//! Each iteration prepares the workspace, scans it afresh, and threads every
//! file through the registered plugins before persisting it:
//!
//! ```text
//! prepare (copy source -> destination) -> scan -> per file:
//!     load -> plugins in registration order -> rename? -> write
//! ```
//!
//! When source and destination differ, preparation removes the destination
//! and copies the source again at the start of every iteration, so each
//! iteration starts from the pristine source tree. In-place runs see the
//! output of the previous iteration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use looper_config::Config;
use looper_fs::{FileSystem, LocalFs};

use crate::descriptor::FileDescriptor;
use crate::error::LoopError;
use crate::filter::should_run;
use crate::plugin::{Plugin, PluginOptions, PluginRegistry};
use crate::request::{DEFAULT_ITERATION_COUNT, RunRequest};

/// Driver options. Reserved; carries no fields yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LooperOptions;

/// Counters reported when a run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations completed.
    pub iterations: usize,
    /// Files loaded and persisted, summed over all iterations.
    pub files_processed: usize,
    /// Plugin invocations, summed over all iterations.
    pub plugin_runs: usize,
    /// Files moved to a new path, summed over all iterations.
    pub files_renamed: usize,
}

/// Runs registered plugins over every file of a directory tree.
///
/// # Example
///
/// ```no_run
/// use looper_core::{FileDescriptor, Looper, MatchRule, PluginOptions, PluginResult};
///
/// let mut looper = Looper::with_destination("src", "dist");
/// looper.register_plugin(
///     |file: &mut FileDescriptor| -> PluginResult {
///         file.push_str("\n/* built */\n");
///         Ok(())
///     },
///     Some(PluginOptions::new().with_only_do(MatchRule::new().with_extension("css"))),
/// );
/// let summary = looper.run(None)?;
/// println!("{} files processed", summary.files_processed);
/// # Ok::<(), looper_core::LoopError>(())
/// ```
pub struct Looper {
    source_dir: PathBuf,
    destination_dir: PathBuf,
    options: LooperOptions,
    fs: Arc<dyn FileSystem>,
    registry: PluginRegistry,
}

impl Looper {
    /// Driver that transforms `source_dir` in place.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self::create(source_dir, None::<PathBuf>, LooperOptions)
    }

    /// Driver that copies `source_dir` to `destination_dir` and transforms
    /// the copy.
    #[must_use]
    pub fn with_destination(
        source_dir: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self::create(source_dir, Some(destination_dir), LooperOptions)
    }

    /// Driver with every setting explicit. The destination defaults to the
    /// source.
    #[must_use]
    pub fn create(
        source_dir: impl Into<PathBuf>,
        destination_dir: Option<impl Into<PathBuf>>,
        options: LooperOptions,
    ) -> Self {
        let source_dir = source_dir.into();
        let destination_dir = destination_dir.map_or_else(|| source_dir.clone(), Into::into);
        Self {
            source_dir,
            destination_dir,
            options,
            fs: Arc::new(LocalFs),
            registry: PluginRegistry::new(),
        }
    }

    /// Driver for the resolved paths of a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let paths = &config.paths_resolved;
        Self::create(
            paths.source_dir.clone(),
            Some(paths.destination_dir.clone()),
            LooperOptions,
        )
    }

    /// Replace the filesystem the driver works through.
    #[must_use]
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Append a plugin. Plugins run in registration order.
    pub fn register_plugin(
        &mut self,
        plugin: impl Plugin + 'static,
        options: Option<PluginOptions>,
    ) -> &mut Self {
        self.registry.register(plugin, options);
        self
    }

    /// Registered plugins.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Source directory as configured.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Destination directory as configured.
    #[must_use]
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Driver options.
    #[must_use]
    pub fn options(&self) -> LooperOptions {
        self.options
    }

    /// Run every iteration and return the accumulated counters.
    ///
    /// # Errors
    ///
    /// - [`LoopError::Configuration`] for a zero iteration count or nested
    ///   source and destination directories
    /// - [`LoopError::SourceNotFound`] if the source directory is missing
    /// - [`LoopError::Io`] if resolving the directories, preparing,
    ///   scanning, reading, renaming or writing fails
    /// - [`LoopError::Plugin`] for the first plugin error; files already
    ///   persisted are left as they are
    pub fn run(&mut self, request: Option<&RunRequest>) -> Result<RunSummary, LoopError> {
        let iterations = request.map_or(DEFAULT_ITERATION_COUNT, RunRequest::iterations);
        if iterations == 0 {
            return Err(LoopError::Configuration(
                "iteration count must be greater than 0".to_owned(),
            ));
        }

        // Resolved so that two spellings of one directory compare equal
        let source = self.fs.resolve(&self.source_dir)?;
        let destination = self.fs.resolve(&self.destination_dir)?;
        if !self.fs.exists(&source) {
            return Err(LoopError::SourceNotFound(source));
        }
        let in_place = source == destination;
        if !in_place && (destination.starts_with(&source) || source.starts_with(&destination)) {
            return Err(LoopError::Configuration(format!(
                "source {} and destination {} must not contain each other",
                source.display(),
                destination.display()
            )));
        }

        tracing::info!(
            source = %source.display(),
            destination = %destination.display(),
            iterations,
            plugins = self.registry.len(),
            "Starting run"
        );

        let mut summary = RunSummary::default();
        for loop_number in 1..=iterations {
            tracing::info!(iteration = loop_number, total = iterations, "Starting iteration");

            if !in_place {
                self.prepare(&source, &destination)?;
            }

            let paths = self.fs.scan(&destination)?;
            tracing::debug!(iteration = loop_number, files = paths.len(), "Scanned workspace");

            for path in paths {
                self.process_file(&path, loop_number, request, &mut summary)?;
            }
            summary.iterations += 1;
        }

        tracing::info!(
            iterations = summary.iterations,
            files = summary.files_processed,
            plugin_runs = summary.plugin_runs,
            renamed = summary.files_renamed,
            "Run complete"
        );
        Ok(summary)
    }

    /// Replace the destination tree with a fresh copy of the source.
    fn prepare(&self, source: &Path, destination: &Path) -> Result<(), LoopError> {
        if self.fs.exists(destination) {
            tracing::debug!(path = %destination.display(), "Removing previous destination");
            self.fs.remove_tree(destination)?;
        }
        tracing::debug!(from = %source.display(), to = %destination.display(), "Copying source tree");
        self.fs.copy_tree(source, destination)?;
        Ok(())
    }

    fn process_file(
        &mut self,
        path: &Path,
        loop_number: usize,
        request: Option<&RunRequest>,
        summary: &mut RunSummary,
    ) -> Result<(), LoopError> {
        let mut file = FileDescriptor::load(self.fs.as_ref(), path, loop_number)?;

        for (position, entry) in self.registry.iter_mut().enumerate() {
            if !should_run(&file, entry.options(), request) {
                continue;
            }
            tracing::debug!(path = %path.display(), plugin = %entry.label(position), "Running plugin");
            entry.process(&mut file).map_err(|source| LoopError::Plugin {
                plugin: entry.label(position),
                position,
                path: path.to_path_buf(),
                source,
            })?;
            summary.plugin_runs += 1;
        }

        let mut target = path.to_path_buf();
        if let Some(renamed) = file.renamed_path().filter(|renamed| renamed != path) {
            tracing::debug!(from = %path.display(), to = %renamed.display(), "Renaming file");
            self.fs.rename(path, &renamed)?;
            summary.files_renamed += 1;
            target = renamed;
        }

        self.fs.write(&target, &file.persisted_bytes())?;
        summary.files_processed += 1;
        Ok(())
    }
}

impl std::fmt::Debug for Looper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Looper")
            .field("source_dir", &self.source_dir)
            .field("destination_dir", &self.destination_dir)
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
