//! Types command implementation.
//!
//! The `planwright types` command lists the registered step types with their
//! parameters and outputs.

use crate::cli::args::TypesArgs;
use crate::error::Result;
use crate::registry::StepDefinition;
use crate::ui::UserInterface;

use super::builtin_registry;
use super::dispatcher::{Command, CommandResult};

/// The types command implementation.
pub struct TypesCommand {
    args: TypesArgs,
}

impl TypesCommand {
    /// Create a new types command.
    pub fn new(args: TypesArgs) -> Self {
        Self { args }
    }

    fn describe(definition: &StepDefinition) -> Vec<String> {
        let mut lines = vec![format!(
            "{:<20} {}",
            definition.step_type, definition.description
        )];
        let list = |names: &[String]| {
            if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            }
        };
        lines.push(format!("    required: {}", list(&definition.required_params)));
        lines.push(format!("    optional: {}", list(&definition.optional_params)));
        lines.push(format!("    outputs:  {}", list(&definition.outputs)));
        lines
    }
}

impl Command for TypesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (registry, _) = builtin_registry()?;
        let definitions = registry.list();

        if self.args.json {
            let json = serde_json::to_string_pretty(&definitions).map_err(anyhow::Error::from)?;
            ui.print(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header("Step types");
        for definition in &definitions {
            for line in Self::describe(definition) {
                ui.message(&line);
            }
        }

        Ok(CommandResult::success())
    }
}
