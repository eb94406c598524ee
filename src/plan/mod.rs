//! Execution plan model and plan files.
//!
//! - Schema definitions in [`schema`]
//! - File loading and JSON schema in [`loader`]

pub mod loader;
pub mod schema;

pub use loader::{load_plan, parse_plan, plan_schema, PlanFormat};
pub use schema::{
    ConditionCheck, ExecutionPlan, Outputs, Params, PlanStep, StepCondition, StepOutputs,
};
