//! Configuration management for looper.
//!
//! Parses `looper.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Host-program settings can be applied during load via [`ConfigOverrides`].
//!
//! ## Environment Variable Expansion
//!
//! Path values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields are `paths.source_dir` and `paths.destination_dir`.
//! Loading fails with [`ConfigError::EnvVar`] listing every unset reference
//! across both fields.

mod expand;

pub use expand::UnsetVar;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override source directory.
    pub source_dir: Option<PathBuf>,
    /// Override destination directory.
    pub destination_dir: Option<PathBuf>,
    /// Override iteration count.
    pub iteration_count: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "looper.toml";

/// Default source directory, relative to the config file.
const DEFAULT_SOURCE_DIR: &str = "src";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory configuration (paths are relative strings from TOML).
    paths: PathsConfigRaw,
    /// Default run request.
    pub run: RunConfig,

    /// Resolved directory configuration (set after loading).
    #[serde(skip)]
    pub paths_resolved: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw directory configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsConfigRaw {
    source_dir: Option<String>,
    destination_dir: Option<String>,
}

/// Resolved directory configuration with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// Directory the pipeline reads from.
    pub source_dir: PathBuf,
    /// Workspace the pipeline writes to. Equal to `source_dir` when the
    /// pipeline operates in place.
    pub destination_dir: PathBuf,
}

impl PathsConfig {
    /// Whether the pipeline mutates the source tree directly.
    #[must_use]
    pub fn in_place(&self) -> bool {
        self.source_dir == self.destination_dir
    }
}

/// The `[run]` table: defaults for a single run.
///
/// Every field is optional:
/// - `iteration_count` defaults to 1
/// - `only_do` absent means every plugin is selected
/// - `exclude` absent means no plugin is excluded
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of full passes over the workspace.
    pub iteration_count: Option<usize>,
    /// Plugins to run, by id or category.
    pub only_do: Option<SelectionConfig>,
    /// Plugins to skip, by id or category.
    pub exclude: Option<SelectionConfig>,
}

/// Plugin selection by id and/or category.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Plugin ids.
    pub ids: Option<Vec<String>>,
    /// Plugin categories.
    pub categories: Option<Vec<String>>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Path settings reference environment variables that are not set.
    #[error("Unset environment variables: {}", join_unset(.0))]
    EnvVar(Vec<UnsetVar>),
}

fn join_unset(unset: &[UnsetVar]) -> String {
    unset
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `looper.toml` in current directory and parents.
    ///
    /// Overrides are applied after loading and path resolution, so values
    /// supplied by the host program take precedence over the config file.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(source_dir) = &overrides.source_dir {
            // An in-place pipeline stays in place when only the source moves
            if self.paths_resolved.in_place() && overrides.destination_dir.is_none() {
                self.paths_resolved.destination_dir.clone_from(source_dir);
            }
            self.paths_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(destination_dir) = &overrides.destination_dir {
            self.paths_resolved
                .destination_dir
                .clone_from(destination_dir);
        }
        if let Some(iteration_count) = overrides.iteration_count {
            self.run.iteration_count = Some(iteration_count);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let source_dir = base.join(DEFAULT_SOURCE_DIR);
        Self {
            paths: PathsConfigRaw::default(),
            run: RunConfig::default(),
            paths_resolved: PathsConfig {
                destination_dir: source_dir.clone(),
                source_dir,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        expand::expand_paths(&mut config.paths)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_paths()?;
        self.validate_run()?;
        Ok(())
    }

    fn validate_paths(&self) -> Result<(), ConfigError> {
        if let Some(source_dir) = &self.paths.source_dir {
            require_non_empty(source_dir, "paths.source_dir")?;
        }
        if let Some(destination_dir) = &self.paths.destination_dir {
            require_non_empty(destination_dir, "paths.destination_dir")?;
        }
        Ok(())
    }

    fn validate_run(&self) -> Result<(), ConfigError> {
        if self.run.iteration_count == Some(0) {
            return Err(ConfigError::Validation(
                "run.iteration_count must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// The destination defaults to the source, i.e. in-place processing.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let source_dir =
            config_dir.join(self.paths.source_dir.as_deref().unwrap_or(DEFAULT_SOURCE_DIR));
        let destination_dir = self
            .paths
            .destination_dir
            .as_deref()
            .map_or_else(|| source_dir.clone(), |d| config_dir.join(d));

        self.paths_resolved = PathsConfig {
            source_dir,
            destination_dir,
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/project"));

        assert_eq!(
            config.paths_resolved.source_dir,
            PathBuf::from("/project/src")
        );
        assert!(config.paths_resolved.in_place());
        assert_eq!(config.run, RunConfig::default());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.run.iteration_count.is_none());
        assert!(config.run.only_do.is_none());
        assert!(config.run.exclude.is_none());
    }

    #[test]
    fn test_parse_run_config() {
        let toml = r#"
[run]
iteration_count = 3

[run.only_do]
ids = ["minify"]
categories = ["demo"]

[run.exclude]
categories = ["slow"]
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.run.iteration_count, Some(3));
        assert_eq!(
            config.run.only_do,
            Some(SelectionConfig {
                ids: Some(vec!["minify".to_owned()]),
                categories: Some(vec!["demo".to_owned()]),
            })
        );
        assert_eq!(
            config.run.exclude,
            Some(SelectionConfig {
                ids: None,
                categories: Some(vec!["slow".to_owned()]),
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_run_fields() {
        let toml = r#"
[run]
num_loops = 2
"#;
        let result: Result<Config, _> = toml::from_str(toml);

        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[paths]
source_dir = "site"
destination_dir = "build/site"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.paths_resolved,
            PathsConfig {
                source_dir: PathBuf::from("/project/site"),
                destination_dir: PathBuf::from("/project/build/site"),
            }
        );
        assert!(!config.paths_resolved.in_place());
    }

    #[test]
    fn test_destination_defaults_to_source() {
        let toml = r#"
[paths]
source_dir = "site"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.paths_resolved.destination_dir,
            PathBuf::from("/project/site")
        );
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let toml = r"
[run]
iteration_count = 0
";
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("iteration_count"));
    }

    #[test]
    fn test_empty_source_dir_rejected() {
        let toml = r#"
[paths]
source_dir = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default_with_base(Path::new("/project"));
        let overrides = ConfigOverrides {
            destination_dir: Some(PathBuf::from("/out")),
            iteration_count: Some(2),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        assert_eq!(
            config.paths_resolved.source_dir,
            PathBuf::from("/project/src")
        );
        assert_eq!(config.paths_resolved.destination_dir, PathBuf::from("/out"));
        assert_eq!(config.run.iteration_count, Some(2));
    }

    #[test]
    fn test_source_override_keeps_in_place() {
        let mut config = Config::default_with_base(Path::new("/project"));
        let overrides = ConfigOverrides {
            source_dir: Some(PathBuf::from("/elsewhere")),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        assert_eq!(
            config.paths_resolved.source_dir,
            PathBuf::from("/elsewhere")
        );
        assert!(config.paths_resolved.in_place());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[paths]
source_dir = "src"
destination_dir = "dist"

[run]
iteration_count = 2
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.paths_resolved.source_dir,
            temp_dir.path().join("src")
        );
        assert_eq!(
            config.paths_resolved.destination_dir,
            temp_dir.path().join("dist")
        );
        assert_eq!(config.run.iteration_count, Some(2));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/looper.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[run\niteration_count = ").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_reports_unset_path_variables() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[paths]\nsource_dir = \"${LOOPER_UNSET_SOURCE_ROOT}/src\"\ndestination_dir = \"${LOOPER_UNSET_DEST_ROOT:-dist}\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        match err {
            ConfigError::EnvVar(unset) => {
                assert_eq!(unset.len(), 1);
                assert_eq!(unset[0].name, "LOOPER_UNSET_SOURCE_ROOT");
                assert_eq!(unset[0].field, "paths.source_dir");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_override_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = ConfigOverrides {
            iteration_count: Some(0),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
