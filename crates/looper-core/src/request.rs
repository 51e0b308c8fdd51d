//! Per-invocation plugin selection.

use looper_config::{RunConfig, SelectionConfig};

/// Iteration count used when a request doesn't specify one.
pub const DEFAULT_ITERATION_COUNT: usize = 1;

/// Plugin selection by id and/or category.
///
/// Either list may be absent. An absent list never matches; a present list
/// is tested against the plugin's declared id or categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Plugin ids. Default: absent.
    pub ids: Option<Vec<String>>,
    /// Plugin categories. Default: absent.
    pub categories: Option<Vec<String>>,
}

impl Selection {
    /// Selection with both lists absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id list.
    #[must_use]
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set the category list.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// `only_do` semantics: the plugin's id is listed, or one of its
    /// categories is listed.
    #[must_use]
    pub fn selects(&self, id: Option<&str>, categories: &[String]) -> bool {
        let id_listed = self
            .ids
            .as_ref()
            .is_some_and(|ids| id.is_some_and(|id| ids.iter().any(|i| i == id)));
        let category_listed = self
            .categories
            .as_ref()
            .is_some_and(|listed| listed.iter().any(|c| categories.contains(c)));
        id_listed || category_listed
    }

    /// `exclude` semantics: the plugin's id is not listed, or it has a
    /// category that is not listed.
    #[must_use]
    pub fn spares(&self, id: Option<&str>, categories: &[String]) -> bool {
        let id_unlisted = self
            .ids
            .as_ref()
            .is_some_and(|ids| !id.is_some_and(|id| ids.iter().any(|i| i == id)));
        let category_unlisted = self
            .categories
            .as_ref()
            .is_some_and(|listed| categories.iter().any(|c| !listed.contains(c)));
        id_unlisted || category_unlisted
    }
}

impl From<&SelectionConfig> for Selection {
    fn from(config: &SelectionConfig) -> Self {
        Self {
            ids: config.ids.clone(),
            categories: config.categories.clone(),
        }
    }
}

/// Options for one `run()` call.
///
/// - `iteration_count`: default [`DEFAULT_ITERATION_COUNT`]
/// - `only_do`: default absent (all plugins selected)
/// - `exclude`: default absent (no plugin excluded)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Number of full passes over the workspace.
    pub iteration_count: Option<usize>,
    /// Plugins to run.
    pub only_do: Option<Selection>,
    /// Plugins to skip.
    pub exclude: Option<Selection>,
}

impl RunRequest {
    /// Request with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration count.
    #[must_use]
    pub fn with_iteration_count(mut self, iteration_count: usize) -> Self {
        self.iteration_count = Some(iteration_count);
        self
    }

    /// Set the `only_do` selection.
    #[must_use]
    pub fn with_only_do(mut self, selection: Selection) -> Self {
        self.only_do = Some(selection);
        self
    }

    /// Set the `exclude` selection.
    #[must_use]
    pub fn with_exclude(mut self, selection: Selection) -> Self {
        self.exclude = Some(selection);
        self
    }

    /// Effective iteration count.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iteration_count.unwrap_or(DEFAULT_ITERATION_COUNT)
    }
}

impl From<&RunConfig> for RunRequest {
    fn from(config: &RunConfig) -> Self {
        Self {
            iteration_count: config.iteration_count,
            only_do: config.only_do.as_ref().map(Selection::from),
            exclude: config.exclude.as_ref().map(Selection::from),
        }
    }
}
