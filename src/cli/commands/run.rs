//! Run command implementation.
//!
//! The `planwright run` command executes a plan against the built-in step
//! types, reports per-step progress and prints a summary or the full result
//! as JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::RunArgs;
use crate::config::load_settings_or_default;
use crate::engine::{format_duration, OrchestrationResult, OrchestrationStatus, Orchestrator};
use crate::error::{PlanwrightError, Result};
use crate::ui::{ProgressSpinner, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::{builtin_registry, load_plan_reporting};

/// The run command implementation.
pub struct RunCommand {
    settings_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(settings_path: Option<&Path>, args: RunArgs) -> Self {
        Self {
            settings_path: settings_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn report(&self, result: &OrchestrationResult, dry_run: bool, ui: &mut dyn UserInterface) {
        let title = if dry_run {
            format!("{} (dry run)", result.plan_name)
        } else {
            result.plan_name.clone()
        };
        ui.show_header(&title);

        for step in &result.steps {
            ui.step_line(step.status, &step.summary_line());
        }

        // Validation and ordering errors are not tied to a recorded step
        if result.steps.is_empty() {
            for error in &result.errors {
                ui.error(error);
            }
        }

        let duration = format_duration(Duration::from_millis(result.duration_ms));
        match result.status {
            OrchestrationStatus::Completed => {
                ui.success(&format!("Plan '{}' completed in {}", result.plan_id, duration))
            }
            OrchestrationStatus::Partial | OrchestrationStatus::RolledBack => ui.warning(&format!(
                "Plan '{}' finished {} in {}",
                result.plan_id, result.status, duration
            )),
            OrchestrationStatus::Failed => {
                ui.error(&format!("Plan '{}' failed", result.plan_id))
            }
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = match load_settings_or_default(self.settings_path.as_deref()) {
            Ok(settings) => settings,
            Err(
                e @ (PlanwrightError::SettingsNotFound { .. }
                | PlanwrightError::SettingsParseError { .. }),
            ) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let Some(plan) = load_plan_reporting(&self.args.plan, ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let (registry, manager) = builtin_registry()?;
        let mut options = settings.to_options();
        options.dry_run |= self.args.dry_run;
        let dry_run = options.dry_run;

        let spinner = if self.args.json {
            ProgressSpinner::hidden()
        } else {
            ui.start_spinner(&format!("Running plan '{}'", plan.id))
        };
        let bar = spinner.bar_clone();
        let orchestrator = Orchestrator::with_options(registry, options)
            .on_step_start(move |step_id| bar.set_message(format!("Running {}", step_id)));

        let runtime = tokio::runtime::Runtime::new()?;
        let result = runtime.block_on(orchestrator.execute(&plan));
        spinner.finish();
        tracing::debug!(
            plan_id = %plan.id,
            resources = manager.len(),
            "Run finished"
        );

        if self.args.json {
            let json = serde_json::to_string_pretty(&result).map_err(anyhow::Error::from)?;
            ui.print(&json);
        } else {
            self.report(&result, dry_run, ui);
        }

        if result.is_success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
