//! Plugin eligibility rules.
//!
//! A plugin runs on a file when both hold:
//!
//! 1. **Declared eligibility**: the file satisfies the plugin's `only_do`
//!    rule (if any) and does not satisfy its `exclude` rule (if any).
//! 2. **Request eligibility**: the plugin's id/categories pass the run
//!    request's `only_do` and `exclude` selections (if a request is given).
//!
//! All comparisons are case-sensitive.

use glob::Pattern;
use regex::Regex;

use crate::descriptor::FileDescriptor;
use crate::plugin::PluginOptions;
use crate::request::RunRequest;

/// A single test against one string field of a file.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Exact string equality. For directories: the directory ends with it.
    Exact(String),
    /// Regular expression search.
    Regex(Regex),
    /// Glob pattern matched against the whole value.
    Glob(Pattern),
}

impl Condition {
    /// Exact-match condition.
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    /// Regular expression condition.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern is invalid.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Regex)
    }

    /// Glob condition.
    ///
    /// # Errors
    ///
    /// Returns [`glob::PatternError`] if the pattern is invalid.
    pub fn glob(pattern: &str) -> Result<Self, glob::PatternError> {
        Pattern::new(pattern).map(Self::Glob)
    }

    /// Test a plain field value.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == value,
            Self::Regex(regex) => regex.is_match(value),
            Self::Glob(pattern) => pattern.matches(value),
        }
    }

    /// Test a directory path. Literals match as a suffix so both relative
    /// (`drafts`, `posts/drafts`) and absolute directories work.
    #[must_use]
    pub fn matches_directory(&self, directory: &str) -> bool {
        match self {
            Self::Exact(suffix) => directory.ends_with(suffix.as_str()),
            _ => self.matches(directory),
        }
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Self::exact(value)
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Self::Exact(value)
    }
}

impl From<Regex> for Condition {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<Pattern> for Condition {
    fn from(pattern: Pattern) -> Self {
        Self::Glob(pattern)
    }
}

/// Declarative file conditions, keyed by the field they test.
///
/// A file satisfies the rule when it satisfies **any** condition under
/// **any** key. A rule with no conditions is satisfied by nothing.
#[derive(Debug, Clone, Default)]
pub struct MatchRule {
    /// Conditions on the absolute path.
    pub full_file_paths: Vec<Condition>,
    /// Conditions on the full file name (`site.min.css`).
    pub full_file_names: Vec<Condition>,
    /// Conditions on the base name (`site.min`).
    pub file_names: Vec<Condition>,
    /// Conditions on the containing directory.
    pub directories: Vec<Condition>,
    /// Conditions on the extension (`css`).
    pub extensions: Vec<Condition>,
}

impl MatchRule {
    /// Empty rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a full-path condition.
    #[must_use]
    pub fn with_full_file_path(mut self, condition: impl Into<Condition>) -> Self {
        self.full_file_paths.push(condition.into());
        self
    }

    /// Add a full-file-name condition.
    #[must_use]
    pub fn with_full_file_name(mut self, condition: impl Into<Condition>) -> Self {
        self.full_file_names.push(condition.into());
        self
    }

    /// Add a base-name condition.
    #[must_use]
    pub fn with_file_name(mut self, condition: impl Into<Condition>) -> Self {
        self.file_names.push(condition.into());
        self
    }

    /// Add a directory condition.
    #[must_use]
    pub fn with_directory(mut self, condition: impl Into<Condition>) -> Self {
        self.directories.push(condition.into());
        self
    }

    /// Add an extension condition.
    #[must_use]
    pub fn with_extension(mut self, condition: impl Into<Condition>) -> Self {
        self.extensions.push(condition.into());
        self
    }

    /// Whether `file` satisfies at least one condition.
    #[must_use]
    pub fn matches(&self, file: &FileDescriptor) -> bool {
        let directory = file.directory().to_string_lossy();

        any_matches(&self.full_file_paths, &file.full_file_path().to_string_lossy())
            || any_matches(&self.full_file_names, file.full_file_name())
            || any_matches(&self.file_names, file.file_name())
            || self
                .directories
                .iter()
                .any(|c| c.matches_directory(&directory))
            || any_matches(&self.extensions, file.extension())
    }
}

fn any_matches(conditions: &[Condition], value: &str) -> bool {
    conditions.iter().any(|c| c.matches(value))
}

/// Decide whether a plugin runs on a file.
#[must_use]
pub fn should_run(
    file: &FileDescriptor,
    options: &PluginOptions,
    request: Option<&RunRequest>,
) -> bool {
    declared_pass(file, options) && request.is_none_or(|r| request_pass(options, r))
}

/// The plugin's own `only_do` / `exclude` rules.
#[must_use]
pub fn declared_pass(file: &FileDescriptor, options: &PluginOptions) -> bool {
    let only_do = options.only_do.as_ref().is_none_or(|rule| rule.matches(file));
    let exclude = options.exclude.as_ref().is_none_or(|rule| !rule.matches(file));
    only_do && exclude
}

/// The run request's `only_do` / `exclude` selections.
#[must_use]
pub fn request_pass(options: &PluginOptions, request: &RunRequest) -> bool {
    let id = options.id.as_deref();
    let categories = options.categories.as_slice();

    let only_do = request
        .only_do
        .as_ref()
        .is_none_or(|selection| selection.selects(id, categories));
    let exclude = request
        .exclude
        .as_ref()
        .is_none_or(|selection| selection.spares(id, categories));
    only_do && exclude
}
