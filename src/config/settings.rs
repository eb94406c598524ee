//! Orchestrator settings file.
//!
//! ```yaml
//! dry_run: false
//! concurrency: 1
//! step_timeout_ms: 300000
//! labels:
//!   team: platform
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::OrchestratorOptions;
use crate::error::{PlanwrightError, Result};

/// Settings applied to every plan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulate every run
    #[serde(skip_serializing_if = "is_false")]
    pub dry_run: bool,

    /// Parallelism hint
    #[serde(
        default = "default_concurrency",
        skip_serializing_if = "is_default_concurrency"
    )]
    pub concurrency: usize,

    /// Timeout for steps that do not set their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_timeout_ms: Option<u64>,

    /// Labels passed to every handler
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

fn default_concurrency() -> usize {
    1
}

fn is_default_concurrency(value: &usize) -> bool {
    *value == default_concurrency()
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: default_concurrency(),
            step_timeout_ms: None,
            labels: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Copy these settings onto orchestrator options.
    ///
    /// Callbacks on `options` are kept. `dry_run` is only ever switched on.
    pub fn apply(&self, mut options: OrchestratorOptions) -> OrchestratorOptions {
        options.dry_run |= self.dry_run;
        options.concurrency = self.concurrency.max(1);
        if let Some(ms) = self.step_timeout_ms {
            options.step_timeout = Some(Duration::from_millis(ms));
        }
        options
            .global_labels
            .extend(self.labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        options
    }

    /// Orchestrator options from these settings alone.
    pub fn to_options(&self) -> OrchestratorOptions {
        self.apply(OrchestratorOptions::default())
    }
}

/// Load a settings file.
///
/// # Errors
///
/// Returns `SettingsNotFound` if the file doesn't exist.
/// Returns `SettingsParseError` if the content is not valid YAML settings.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PlanwrightError::SettingsNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PlanwrightError::Io(e)
        }
    })?;

    parse_settings(&content, path)
}

/// Parse YAML settings content.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(content).map_err(|e| PlanwrightError::SettingsParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load settings from `path`, or use defaults when no path was given.
pub fn load_settings_or_default(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_sequential_and_live() {
        let settings = Settings::default();
        assert!(!settings.dry_run);
        assert_eq!(settings.concurrency, 1);
        assert!(settings.step_timeout_ms.is_none());
        assert!(settings.labels.is_empty());
    }

    #[test]
    fn parses_partial_yaml() {
        let settings = parse_settings("step_timeout_ms: 500", Path::new("s.yml")).unwrap();
        assert_eq!(settings.step_timeout_ms, Some(500));
        assert_eq!(settings.concurrency, 1);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings = parse_settings("\n", Path::new("s.yml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result = parse_settings("concurrency: [", Path::new("s.yml"));
        assert!(matches!(
            result,
            Err(PlanwrightError::SettingsParseError { .. })
        ));
    }

    #[test]
    fn load_settings_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("planwright.yml");
        fs::write(&path, "dry_run: true\nlabels:\n  team: platform\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert!(settings.dry_run);
        assert_eq!(settings.labels["team"], "platform");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = load_settings_or_default(Some(Path::new("/nonexistent/planwright.yml")));
        assert!(matches!(
            result,
            Err(PlanwrightError::SettingsNotFound { .. })
        ));
        assert_eq!(load_settings_or_default(None).unwrap(), Settings::default());
    }

    #[test]
    fn apply_sets_options() {
        let settings = Settings {
            dry_run: true,
            concurrency: 0,
            step_timeout_ms: Some(250),
            labels: BTreeMap::from([("env".to_string(), "prod".to_string())]),
        };

        let options = settings.to_options();
        assert!(options.dry_run);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.step_timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.global_labels["env"], "prod");
    }
}
