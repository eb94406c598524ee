//! Terminal output for the CLI.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for tests
//! - A spinner and a color theme
//!
//! # Example
//!
//! ```
//! use planwright::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.success("Plan is valid");
//! assert!(ui.has_success("Plan is valid"));
//! ```

pub mod mock;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, PlanTheme};

use crate::engine::StepStatus;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Show a plain status message.
    fn message(&mut self, msg: &str);

    /// Show a success message.
    fn success(&mut self, msg: &str);

    /// Show a warning message.
    fn warning(&mut self, msg: &str);

    /// Show an error message. Errors are shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show one step's summary line, styled by its status.
    fn step_line(&mut self, status: StepStatus, line: &str);

    /// Show a section header.
    fn show_header(&mut self, title: &str);

    /// Write machine-readable output, unstyled, in every mode.
    fn print(&mut self, text: &str);

    /// Start a spinner; hidden when the mode or terminal does not allow one.
    fn start_spinner(&mut self, message: &str) -> ProgressSpinner;
}
