//! Best-effort rollback of completed steps.

use std::collections::BTreeMap;

use tracing::Instrument;

use crate::plan::{PlanStep, StepOutputs};
use crate::registry::{StepContext, StepTypeRegistry};

/// What a rollback sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Steps undone, in rollback order.
    pub rolled_back: Vec<String>,
    /// Steps whose handler cannot roll back.
    pub skipped: Vec<String>,
    /// Steps whose rollback failed, with the error.
    pub failed: Vec<(String, String)>,
}

impl RollbackReport {
    /// Check if every attempted rollback succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Roll back `completed` steps, most recently completed first.
///
/// `completed` is in completion order. Each reversible handler gets the
/// step's original parameters and its recorded outputs. Its context only
/// holds outputs of steps not yet undone. A failure is logged
/// and the sweep moves on to the next step.
pub async fn roll_back(
    registry: &StepTypeRegistry,
    completed: &[&PlanStep],
    outputs: &StepOutputs,
    labels: &BTreeMap<String, String>,
) -> RollbackReport {
    let mut report = RollbackReport::default();
    let mut remaining = outputs.clone();

    for step in completed.iter().rev() {
        let handler = match registry.get_handler(&step.step_type) {
            Some(handler) if handler.supports_rollback() => handler,
            _ => {
                tracing::debug!(step_id = %step.id, "Step is not reversible, skipping rollback");
                report.skipped.push(step.id.clone());
                continue;
            }
        };

        let step_outputs = outputs.get(&step.id).cloned().unwrap_or_default();
        let mut ctx = StepContext::new(step.id.clone(), step.params.clone());
        ctx.outputs = remaining.clone();
        ctx.labels = labels.clone();

        let span = tracing::info_span!("rollback", step_id = %step.id, step_type = %step.step_type);
        match handler.rollback(&ctx, &step_outputs).instrument(span).await {
            Ok(()) => {
                tracing::info!(step_id = %step.id, "Rolled back step");
                remaining.remove(&step.id);
                report.rolled_back.push(step.id.clone());
            }
            Err(e) => {
                tracing::warn!(step_id = %step.id, error = %e, "Rollback failed");
                report.failed.push((step.id.clone(), e.to_string()));
            }
        }
    }

    report
}
