//! Step type definitions.

use serde::Serialize;

/// Parameter and output schema of a step type.
///
/// Definitions are used for validation and listing only, never for
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Type name, e.g. `storage.bucket`.
    pub step_type: String,
    /// Category tag, e.g. `storage`.
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Parameters that must be present and non-empty.
    pub required_params: Vec<String>,
    /// Parameters the step understands but does not need.
    pub optional_params: Vec<String>,
    /// Outputs the step produces on success.
    pub outputs: Vec<String>,
}

impl StepDefinition {
    /// Create a definition with no parameters or outputs.
    pub fn new(step_type: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            step_type: step_type.into(),
            category: category.into(),
            description: String::new(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the required parameter names.
    pub fn with_required(mut self, names: &[&str]) -> Self {
        self.required_params = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the optional parameter names.
    pub fn with_optional(mut self, names: &[&str]) -> Self {
        self.optional_params = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the output names.
    pub fn with_outputs(mut self, names: &[&str]) -> Self {
        self.outputs = names.iter().map(|s| s.to_string()).collect();
        self
    }
}
