//! Plugins and their registry.
//!
//! A plugin is anything implementing [`Plugin`]; closures taking
//! `&mut FileDescriptor` qualify. Each registered plugin carries
//! [`PluginOptions`] describing its identity and which files it applies to.

use crate::descriptor::FileDescriptor;
use crate::filter::MatchRule;

/// Error raised by a plugin. Any error type can be boxed into it with `?`.
pub type PluginError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by [`Plugin::process`].
pub type PluginResult = Result<(), PluginError>;

/// A transform applied to each eligible file.
///
/// # Example
///
/// ```
/// use looper_core::{FileDescriptor, Plugin, PluginResult};
///
/// struct Banner(&'static str);
///
/// impl Plugin for Banner {
///     fn process(&mut self, file: &mut FileDescriptor) -> PluginResult {
///         let body = file.text().unwrap_or_default().to_owned();
///         file.set_text(format!("/* {} */\n{body}", self.0));
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin {
    /// Transform `file` in place.
    ///
    /// # Errors
    ///
    /// Any error aborts the run.
    fn process(&mut self, file: &mut FileDescriptor) -> PluginResult;
}

impl<F> Plugin for F
where
    F: FnMut(&mut FileDescriptor) -> PluginResult,
{
    fn process(&mut self, file: &mut FileDescriptor) -> PluginResult {
        self(file)
    }
}

/// Identity and file rules declared when registering a plugin.
///
/// Every field is optional:
/// - `id`: default absent; not required to be unique
/// - `categories`: default empty
/// - `only_do`: default absent (all files)
/// - `exclude`: default absent (no files)
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    /// Plugin id used by run-request selection.
    pub id: Option<String>,
    /// Categories used by run-request selection.
    pub categories: Vec<String>,
    /// Files the plugin applies to.
    pub only_do: Option<MatchRule>,
    /// Files the plugin never applies to.
    pub exclude: Option<MatchRule>,
}

impl PluginOptions {
    /// Options with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the `only_do` rule.
    #[must_use]
    pub fn with_only_do(mut self, rule: MatchRule) -> Self {
        self.only_do = Some(rule);
        self
    }

    /// Set the `exclude` rule.
    #[must_use]
    pub fn with_exclude(mut self, rule: MatchRule) -> Self {
        self.exclude = Some(rule);
        self
    }
}

/// A registered plugin.
pub struct PluginEntry {
    plugin: Box<dyn Plugin>,
    options: PluginOptions,
}

impl PluginEntry {
    /// Declared options.
    #[must_use]
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Human-readable label: the id, or the registration position.
    #[must_use]
    pub fn label(&self, position: usize) -> String {
        self.options
            .id
            .clone()
            .unwrap_or_else(|| format!("#{position}"))
    }

    pub(crate) fn process(&mut self, file: &mut FileDescriptor) -> PluginResult {
        self.plugin.process(file)
    }
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Plugins in registration order.
///
/// Registration only appends; nothing reorders or removes entries, so
/// execution order always equals registration order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin. Ids are not checked for uniqueness.
    pub fn register(&mut self, plugin: impl Plugin + 'static, options: Option<PluginOptions>) {
        self.entries.push(PluginEntry {
            plugin: Box::new(plugin),
            options: options.unwrap_or_default(),
        });
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PluginEntry> {
        self.entries.iter_mut()
    }
}
