//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that need step types run
//! against the built-in catalog bound to an in-memory resource manager.

pub mod dispatcher;
pub mod run;
pub mod schema;
pub mod types;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use std::path::Path;
use std::sync::Arc;

use crate::error::{PlanwrightError, Result};
use crate::plan::{load_plan, ExecutionPlan};
use crate::registry::{
    register_builtins, ManagerFactories, MemoryResourceManager, ResourceManager, StepTypeRegistry,
};
use crate::ui::UserInterface;

/// Registry holding the built-in catalog, backed by an in-memory manager.
pub(crate) fn builtin_registry() -> Result<(Arc<StepTypeRegistry>, Arc<MemoryResourceManager>)> {
    let registry = StepTypeRegistry::new();
    let manager = Arc::new(MemoryResourceManager::new());
    let shared: Arc<dyn ResourceManager> = manager.clone();
    let count = register_builtins(&registry, &ManagerFactories::shared(shared))?;
    tracing::debug!(count, "Registered built-in step types");
    Ok((Arc::new(registry), manager))
}

/// Load a plan, reporting unreadable or malformed files on the UI.
///
/// Returns `None` when the problem was reported.
pub(crate) fn load_plan_reporting(
    path: &Path,
    ui: &mut dyn UserInterface,
) -> Result<Option<ExecutionPlan>> {
    match load_plan(path) {
        Ok(plan) => Ok(Some(plan)),
        Err(e @ PlanwrightError::PlanNotFound { .. })
        | Err(e @ PlanwrightError::PlanParseError { .. }) => {
            ui.error(&e.to_string());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
