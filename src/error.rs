//! Error types for planwright operations.
//!
//! This module defines [`PlanwrightError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `PlanwrightError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `PlanwrightError::Other`) inside step handlers
//! - Errors raised while a plan runs are recorded on the step result, never
//!   returned from [`Orchestrator::execute`](crate::engine::Orchestrator::execute)

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for planwright operations.
#[derive(Debug, Error)]
pub enum PlanwrightError {
    /// A step type was registered twice.
    #[error("Step type '{step_type}' is already registered")]
    DuplicateStepType { step_type: String },

    /// An output reference points at a step that has not produced outputs.
    #[error("Step '{step}' has no outputs yet")]
    NoOutputsYet { step: String },

    /// An output reference names an output the source step did not produce.
    #[error("Output '{output}' not found on step '{step}'")]
    OutputNotFound { step: String, output: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A dependency names a step that is not part of the plan.
    #[error("Step '{step}' depends on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    /// Step execution failed.
    #[error("Step '{step}' failed: {message}")]
    StepExecutionError { step: String, message: String },

    /// Step handler did not settle in time.
    #[error("Step '{step}' timed out after {timeout_ms}ms")]
    StepTimeout { step: String, timeout_ms: u64 },

    /// Plan file not found at the given location.
    #[error("Plan not found: {path}")]
    PlanNotFound { path: PathBuf },

    /// Failed to parse a plan file.
    #[error("Failed to parse plan at {path}: {message}")]
    PlanParseError { path: PathBuf, message: String },

    /// Settings file not found at an explicitly requested location.
    #[error("Settings not found: {path}")]
    SettingsNotFound { path: PathBuf },

    /// Failed to parse a settings file.
    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParseError { path: PathBuf, message: String },

    /// A blueprint was given missing or malformed parameter values.
    #[error("Invalid blueprint parameter '{param}': {message}")]
    BlueprintParamError { param: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for planwright operations.
pub type Result<T> = std::result::Result<T, PlanwrightError>;
