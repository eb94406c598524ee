//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::engine::StepStatus;

use super::{should_use_colors, OutputMode, PlanTheme, ProgressSpinner, UserInterface};

/// Terminal UI implementation.
///
/// Status goes to stdout, errors to stderr. Spinners only show on a TTY.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: PlanTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            PlanTheme::new()
        } else {
            PlanTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }

    pub fn theme(&self) -> &PlanTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn step_line(&mut self, status: StepStatus, line: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "  {}", self.theme.format_step_line(status, line)).ok();
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn print(&mut self, text: &str) {
        writeln!(self.out, "{}", text).ok();
    }

    fn start_spinner(&mut self, message: &str) -> ProgressSpinner {
        if self.mode.shows_spinners() && self.out.is_term() {
            ProgressSpinner::new(message)
        } else {
            ProgressSpinner::hidden()
        }
    }
}

/// Create the UI for a given output mode.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
