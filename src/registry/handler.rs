//! Step handler contract.
//!
//! A [`StepHandler`] performs the work of one step type. The orchestrator
//! hands it a [`StepContext`] with resolved parameters and read access to
//! every output produced so far in the run.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{PlanwrightError, Result};
use crate::plan::{Outputs, Params, StepOutputs};

/// Logger scoped to one step. Every event carries the step ID.
#[derive(Debug, Clone)]
pub struct StepLogger {
    step_id: String,
}

impl StepLogger {
    /// Create a logger for a step.
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
        }
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(step_id = %self.step_id, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(step_id = %self.step_id, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(step_id = %self.step_id, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(step_id = %self.step_id, "{}", message);
    }
}

/// Execution context passed to a handler.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Step being run.
    pub step_id: String,
    /// Parameters with output references substituted. During rollback these
    /// are the step's original, unresolved parameters.
    pub params: Params,
    /// Outputs of every step completed so far, keyed by step ID.
    pub outputs: StepOutputs,
    /// Simulate effects and return placeholder outputs.
    pub dry_run: bool,
    /// Orchestrator-wide labels (informational).
    pub labels: BTreeMap<String, String>,
    /// Logger scoped to this step.
    pub logger: StepLogger,
}

impl StepContext {
    /// Create a context with no prior outputs or labels.
    pub fn new(step_id: impl Into<String>, params: Params) -> Self {
        let step_id = step_id.into();
        Self {
            logger: StepLogger::new(step_id.clone()),
            step_id,
            params,
            outputs: StepOutputs::new(),
            dry_run: false,
            labels: BTreeMap::new(),
        }
    }

    /// Get a string parameter.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|v| v.as_str())
    }

    /// Get a string parameter that must be present.
    ///
    /// # Errors
    ///
    /// Returns `StepExecutionError` when the parameter is missing or not a
    /// string.
    pub fn require_str(&self, name: &str) -> Result<&str> {
        self.param_str(name)
            .ok_or_else(|| PlanwrightError::StepExecutionError {
                step: self.step_id.clone(),
                message: format!("parameter '{}' must be a string", name),
            })
    }
}

/// Executable capability of a step type.
///
/// `execute` returns the step's named outputs. Handlers that can undo their
/// effect override [`supports_rollback`](StepHandler::supports_rollback) and
/// [`rollback`](StepHandler::rollback); rollback is best-effort.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Perform the step.
    async fn execute(&self, ctx: &StepContext) -> Result<Outputs>;

    /// Whether this handler can undo a completed step.
    fn supports_rollback(&self) -> bool {
        false
    }

    /// Undo a completed step given the outputs it produced.
    async fn rollback(&self, _ctx: &StepContext, _outputs: &Outputs) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl StepHandler for Echo {
        async fn execute(&self, ctx: &StepContext) -> Result<Outputs> {
            let mut outputs = Outputs::new();
            outputs.insert("echo".into(), json!(ctx.require_str("message")?));
            Ok(outputs)
        }
    }

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn param_accessors() {
        let ctx = StepContext::new("a", params(json!({"name": "x", "count": 2})));
        assert_eq!(ctx.param_str("name"), Some("x"));
        assert_eq!(ctx.param_str("count"), None);
        assert!(ctx.require_str("missing").is_err());
    }

    #[tokio::test]
    async fn handler_defaults_to_irreversible() {
        let handler = Echo;
        assert!(!handler.supports_rollback());

        let ctx = StepContext::new("a", params(json!({"message": "hi"})));
        let outputs = handler.execute(&ctx).await.unwrap();
        assert_eq!(outputs["echo"], json!("hi"));
        assert!(handler.rollback(&ctx, &outputs).await.is_ok());
    }
}
