//! Schema command implementation.
//!
//! The `planwright schema` command prints the JSON schema of plan files, for
//! editor integration.

use crate::error::Result;
use crate::plan::plan_schema;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = plan_schema()?;
        let json = serde_json::to_string_pretty(&schema).map_err(anyhow::Error::from)?;
        ui.print(&json);
        Ok(CommandResult::success())
    }
}
