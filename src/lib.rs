//! Planwright - DAG workflow orchestration for infrastructure provisioning.
//!
//! A plan is a list of typed steps. Steps declare dependencies explicitly or
//! implicitly through `$step.<id>.<output>` references in their parameters.
//! Planwright validates the plan, orders it, runs each step through its
//! registered handler and rolls back completed steps when one fails.
//!
//! # Modules
//!
//! - [`blueprint`] - Named generators that produce plans from parameters
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Run settings loading
//! - [`engine`] - Plan execution, conditions and rollback
//! - [`error`] - Error types and result aliases
//! - [`plan`] - Plan model and plan file loading
//! - [`planner`] - Reference resolution, validation and dependency ordering
//! - [`registry`] - Step type registry and built-in step types
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use planwright::planner::resolve;
//! use planwright::plan::StepOutputs;
//! use serde_json::json;
//!
//! let mut outputs = StepOutputs::new();
//! outputs.insert(
//!     "vpc".to_string(),
//!     json!({ "vpc_id": "vpc-123" }).as_object().unwrap().clone(),
//! );
//! let params = json!({ "vpc_id": "$step.vpc.vpc_id" }).as_object().unwrap().clone();
//!
//! let resolved = resolve(&params, &outputs).unwrap();
//! assert_eq!(resolved["vpc_id"], "vpc-123");
//! ```

pub mod blueprint;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod plan;
pub mod planner;
pub mod registry;
pub mod ui;

pub use error::{PlanwrightError, Result};
