//! Step and plan run results.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::{Outputs, PlanStep, StepOutputs};

/// Status of a step after a plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Handler returned outputs.
    Completed,

    /// Parameters could not be resolved, no handler exists, or the handler
    /// failed or timed out.
    Failed,

    /// Condition was false or an earlier step failed.
    Skipped,

    /// Completed, then undone by rollback.
    RolledBack,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Completed => '✓',
            StepStatus::Failed => '✗',
            StepStatus::Skipped => '⊘',
            StepStatus::RolledBack => '↺',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::RolledBack => "rolled-back",
        };
        write!(f, "{}", s)
    }
}

/// Result of one step in a plan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_id: String,
    pub step_name: String,
    pub step_type: String,
    pub status: StepStatus,
    /// Empty unless the step completed.
    pub outputs: Outputs,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl StepResult {
    /// Create a skipped result.
    pub fn skipped(step: &PlanStep) -> Self {
        let now = Utc::now();
        Self::base(step, StepStatus::Skipped, now, now)
    }

    /// Create a completed result.
    pub fn completed(step: &PlanStep, outputs: Outputs, started_at: DateTime<Utc>) -> Self {
        let mut result = Self::base(step, StepStatus::Completed, started_at, Utc::now());
        result.outputs = outputs;
        result
    }

    /// Create a failed result.
    pub fn failed(step: &PlanStep, error: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        let mut result = Self::base(step, StepStatus::Failed, started_at, Utc::now());
        result.error = Some(error.into());
        result
    }

    fn base(
        step: &PlanStep,
        status: StepStatus,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (completed_at - started_at)
            .to_std()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            step_type: step.step_type.clone(),
            status,
            outputs: Outputs::new(),
            duration_ms,
            error: None,
            started_at,
            completed_at,
        }
    }

    /// Duration of the step.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// One-line human-readable summary.
    ///
    /// The display name follows the ID in brackets when it differs from it.
    pub fn summary_line(&self) -> String {
        let mut line = format!("{} {}", self.status.display_char(), self.step_id);
        if !self.step_name.is_empty() && self.step_name != self.step_id {
            line.push_str(&format!(" [{}]", self.step_name));
        }
        line.push_str(&format!(" ({}) {}", self.step_type, self.status));
        if self.status != StepStatus::Skipped {
            line.push_str(&format!(" in {}", format_duration(self.duration())));
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(": {}", error));
        }
        line
    }
}

/// Overall status of a plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrchestrationStatus {
    Completed,
    Failed,
    Partial,
    RolledBack,
}

impl OrchestrationStatus {
    /// Derive the overall status from per-step results.
    ///
    /// Any rolled-back step wins; then failures mixed with completions are
    /// partial; failures alone are failed; anything else is completed.
    pub fn from_steps(steps: &[StepResult]) -> Self {
        let has = |status: StepStatus| steps.iter().any(|s| s.status == status);

        if has(StepStatus::RolledBack) {
            OrchestrationStatus::RolledBack
        } else if has(StepStatus::Failed) && has(StepStatus::Completed) {
            OrchestrationStatus::Partial
        } else if has(StepStatus::Failed) {
            OrchestrationStatus::Failed
        } else {
            OrchestrationStatus::Completed
        }
    }
}

impl std::fmt::Display for OrchestrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrchestrationStatus::Completed => "completed",
            OrchestrationStatus::Failed => "failed",
            OrchestrationStatus::Partial => "partial",
            OrchestrationStatus::RolledBack => "rolled-back",
        };
        write!(f, "{}", s)
    }
}

/// Result of one plan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub plan_id: String,
    pub plan_name: String,
    pub status: OrchestrationStatus,
    /// One entry per plan step in execution order; empty if nothing ran.
    pub steps: Vec<StepResult>,
    /// Outputs of completed steps, keyed by step ID.
    pub outputs: StepOutputs,
    pub errors: Vec<String>,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl OrchestrationResult {
    /// Check if the run completed.
    pub fn is_success(&self) -> bool {
        self.status == OrchestrationStatus::Completed
    }

    /// Get the result of a step.
    pub fn step(&self, step_id: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Step IDs with the given status, in execution order.
    pub fn steps_with_status(&self, status: StepStatus) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.step_id.as_str())
            .collect()
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}
