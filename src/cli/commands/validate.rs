//! Validate command implementation.
//!
//! The `planwright validate` command reports every structural problem of a
//! plan in one pass.

use crate::cli::args::ValidateArgs;
use crate::error::Result;
use crate::planner::{validate_plan, DependencyGraph};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::{builtin_registry, load_plan_reporting};

/// The validate command implementation.
pub struct ValidateCommand {
    args: ValidateArgs,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(args: ValidateArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ValidateArgs {
        &self.args
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(plan) = load_plan_reporting(&self.args.plan, ui)? else {
            return Ok(CommandResult::failure(2));
        };
        let (registry, _) = builtin_registry()?;

        let errors = validate_plan(&plan, &registry);
        if !errors.is_empty() {
            for error in &errors {
                ui.error(&format!("[{}] {}", error.rule, error.message));
            }
            let noun = if errors.len() == 1 { "error" } else { "errors" };
            ui.message(&format!("{} {} found in plan '{}'", errors.len(), noun, plan.id));
            return Ok(CommandResult::failure(1));
        }

        ui.success(&format!("Plan '{}' is valid ({} steps)", plan.id, plan.steps.len()));

        if self.args.show_order {
            let groups = DependencyGraph::from_plan(&plan).parallel_groups()?;
            ui.show_header("Execution order");
            for (i, group) in groups.iter().enumerate() {
                ui.message(&format!("  {}. {}", i + 1, group.join(", ")));
            }
        }

        Ok(CommandResult::success())
    }
}
