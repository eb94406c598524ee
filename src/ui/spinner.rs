//! Progress spinner.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A progress spinner for a plan run.
#[derive(Debug, Clone)]
pub struct ProgressSpinner {
    bar: ProgressBar,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.magenta} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    /// Create a spinner that doesn't show.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Get a clone of the inner progress bar for use in callbacks.
    ///
    /// The clone can be moved into step callbacks; messages set on it update
    /// this spinner.
    pub fn bar_clone(&self) -> ProgressBar {
        self.bar.clone()
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    /// Print a line above the spinner.
    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    /// Stop and remove the spinner.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_accepts_updates() {
        let spinner = ProgressSpinner::hidden();
        assert!(spinner.is_hidden());
        spinner.set_message("Running vpc");
        spinner.bar_clone().set_message("Running subnet");
        spinner.println("✓ vpc");
        spinner.finish();
    }
}
