//! Plan file loading.
//!
//! Plans are stored as YAML (`.yml`, `.yaml`) or JSON (anything else).

use crate::error::{PlanwrightError, Result};
use crate::plan::schema::ExecutionPlan;
use std::fs;
use std::path::Path;

/// On-disk plan encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Yaml,
    Json,
}

impl PlanFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                PlanFormat::Yaml
            }
            _ => PlanFormat::Json,
        }
    }
}

/// Load a plan file.
///
/// # Errors
///
/// Returns `PlanNotFound` if the file doesn't exist.
/// Returns `PlanParseError` if the content is not a valid plan.
pub fn load_plan(path: &Path) -> Result<ExecutionPlan> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PlanwrightError::PlanNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PlanwrightError::Io(e)
        }
    })?;

    parse_plan(&content, PlanFormat::from_path(path), path)
}

/// Parse plan content.
///
/// # Arguments
///
/// * `content` - The YAML or JSON content to parse
/// * `format` - Encoding of `content`
/// * `source_path` - Path for error reporting
pub fn parse_plan(content: &str, format: PlanFormat, source_path: &Path) -> Result<ExecutionPlan> {
    let parsed = match format {
        PlanFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        PlanFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| PlanwrightError::PlanParseError {
        path: source_path.to_path_buf(),
        message,
    })
}

/// JSON Schema for the plan file format.
///
/// # Errors
///
/// Returns `Other` if the generated schema cannot be converted to JSON.
pub fn plan_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(ExecutionPlan);
    let value = serde_json::to_value(&schema).map_err(anyhow::Error::from)?;
    Ok(value)
}
