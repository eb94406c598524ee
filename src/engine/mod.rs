//! Plan execution engine.
//!
//! - [`Orchestrator`] - validates, orders and runs a plan
//! - [`evaluate_condition`] - step condition checks
//! - [`roll_back`] - reverse-order, best-effort undo of completed steps
//! - [`OrchestrationResult`] - what a run produced

pub mod condition;
pub mod orchestrator;
pub mod result;
pub mod rollback;

pub use condition::evaluate_condition;
pub use orchestrator::{Orchestrator, OrchestratorOptions, StepCompleteCallback, StepStartCallback};
pub use result::{
    format_duration, OrchestrationResult, OrchestrationStatus, StepResult, StepStatus,
};
pub use rollback::{roll_back, RollbackReport};
