//! `${VAR}` expansion in `[paths]` settings.
//!
//! Every path field is expanded in one pass. Unset variables without a
//! `:-default` are collected across all fields, so a single error names
//! everything that is missing.

use std::fmt;

use crate::{ConfigError, PathsConfigRaw};

/// A `${VAR}` reference with no value and no default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsetVar {
    /// Config field holding the reference (e.g. `paths.source_dir`).
    pub field: &'static str,
    /// Variable name.
    pub name: String,
}

impl fmt::Display for UnsetVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}} in {}", self.name, self.field)
    }
}

/// Expand the path fields against the process environment.
pub(crate) fn expand_paths(paths: &mut PathsConfigRaw) -> Result<(), ConfigError> {
    expand_paths_with(paths, |name| std::env::var(name).ok())
}

/// Expand the path fields, looking variables up with `lookup`.
///
/// Fields are only rewritten when every reference resolved.
fn expand_paths_with(
    paths: &mut PathsConfigRaw,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let mut unset = Vec::new();
    let source_dir = expand_field(paths.source_dir.as_deref(), "paths.source_dir", &lookup, &mut unset);
    let destination_dir = expand_field(
        paths.destination_dir.as_deref(),
        "paths.destination_dir",
        &lookup,
        &mut unset,
    );

    if !unset.is_empty() {
        return Err(ConfigError::EnvVar(unset));
    }
    paths.source_dir = source_dir;
    paths.destination_dir = destination_dir;
    Ok(())
}

fn expand_field(
    value: Option<&str>,
    field: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    unset: &mut Vec<UnsetVar>,
) -> Option<String> {
    let value = value?;
    let expanded = shellexpand::env_with_context(value, |name| {
        lookup(name).map(Some).ok_or_else(|| name.to_owned())
    });
    match expanded {
        Ok(expanded) => Some(expanded.into_owned()),
        Err(e) => {
            unset.push(UnsetVar {
                field,
                name: e.cause,
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn paths(source_dir: Option<&str>, destination_dir: Option<&str>) -> PathsConfigRaw {
        PathsConfigRaw {
            source_dir: source_dir.map(str::to_owned),
            destination_dir: destination_dir.map(str::to_owned),
        }
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_expands_both_fields() {
        let mut raw = paths(Some("${SITE}/src"), Some("${SITE}/dist"));

        expand_paths_with(&mut raw, env(&[("SITE", "/var/site")])).unwrap();

        assert_eq!(raw.source_dir.as_deref(), Some("/var/site/src"));
        assert_eq!(raw.destination_dir.as_deref(), Some("/var/site/dist"));
    }

    #[test]
    fn test_default_applies_when_unset() {
        let mut raw = paths(Some("${SRC:-pages}"), None);

        expand_paths_with(&mut raw, env(&[])).unwrap();

        assert_eq!(raw.source_dir.as_deref(), Some("pages"));
        assert_eq!(raw.destination_dir, None);
    }

    #[test]
    fn test_literal_unchanged() {
        let mut raw = paths(Some("plain/path"), None);

        expand_paths_with(&mut raw, env(&[])).unwrap();

        assert_eq!(raw.source_dir.as_deref(), Some("plain/path"));
    }

    #[test]
    fn test_reports_every_unset_field() {
        let mut raw = paths(Some("${SRC_ROOT}/src"), Some("${OUT_ROOT}"));

        let err = expand_paths_with(&mut raw, env(&[])).unwrap_err();

        match &err {
            ConfigError::EnvVar(unset) => assert_eq!(
                unset,
                &vec![
                    UnsetVar {
                        field: "paths.source_dir",
                        name: "SRC_ROOT".to_owned(),
                    },
                    UnsetVar {
                        field: "paths.destination_dir",
                        name: "OUT_ROOT".to_owned(),
                    },
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "Unset environment variables: ${SRC_ROOT} in paths.source_dir, ${OUT_ROOT} in paths.destination_dir"
        );
        // Nothing is rewritten on failure
        assert_eq!(raw.source_dir.as_deref(), Some("${SRC_ROOT}/src"));
    }
}
