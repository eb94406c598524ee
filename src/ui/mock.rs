//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.

use super::{OutputMode, ProgressSpinner, UserInterface};
use crate::engine::StepStatus;

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    step_lines: Vec<(StepStatus, String)>,
    headers: Vec<String>,
    printed: Vec<String>,
    spinners: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Step summary lines with the status they were styled by.
    pub fn step_lines(&self) -> &[(StepStatus, String)] {
        &self.step_lines
    }

    /// Check if a step line containing `msg` was shown.
    pub fn has_step_line(&self, msg: &str) -> bool {
        self.step_lines.iter().any(|(_, line)| line.contains(msg))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Raw output written with `print`.
    pub fn printed(&self) -> &[String] {
        &self.printed
    }

    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Check if a message containing `msg` was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a success message containing `msg` was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a warning containing `msg` was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if an error containing `msg` was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn step_line(&mut self, status: StepStatus, line: &str) {
        self.step_lines.push((status, line.to_string()));
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> ProgressSpinner {
        self.spinners.push(message.to_string());
        ProgressSpinner::hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ui_captures_everything() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.success("done");
        ui.warning("careful");
        ui.error("broken");
        ui.show_header("Plan");
        ui.step_line(StepStatus::Skipped, "⊘ dns (dns.record) skipped");
        ui.print("{}");
        ui.start_spinner("Running");

        assert!(ui.has_message("hello"));
        assert!(ui.has_success("done"));
        assert!(ui.has_warning("careful"));
        assert!(ui.has_error("broken"));
        assert_eq!(ui.headers(), ["Plan"]);
        assert!(ui.has_step_line("dns (dns.record)"));
        assert_eq!(ui.step_lines()[0].0, StepStatus::Skipped);
        assert_eq!(ui.printed(), ["{}"]);
        assert_eq!(ui.spinners(), ["Running"]);
    }
}
