//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::CameraStatus;
use crate::domain::codec::SupportVerdict;

/// Width of the label column in tables
const LABEL_WIDTH: usize = 16;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Shared handle to the running spinner, for updates from callbacks
    pub fn spinner_handle(&self) -> Option<ProgressBar> {
        self.spinner.clone()
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a section heading
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bold());
    }

    /// Print a labelled table row
    pub fn row(&self, label: &str, value: &str) {
        println!("  {}", format_row(label, value));
    }

    /// Print one probe result
    pub fn verdict(&self, verdict: &SupportVerdict) {
        println!("  {}", format_verdict(verdict));
    }

    /// Print the camera status line
    pub fn camera_status(&self, status: &CameraStatus) {
        let text = status.to_string();
        let line = match status {
            CameraStatus::Active => text.green(),
            CameraStatus::Failed(_) => text.red(),
            CameraStatus::Inactive | CameraStatus::Stopped => text.dimmed(),
        };
        println!("  {}", line);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// "Label           value"
pub fn format_row(label: &str, value: &str) -> String {
    let label = format!("{:<width$}", label, width = LABEL_WIDTH);
    format!("{}{}", label.cyan(), value)
}

/// "<codec>  ✓ Supported" or "<codec>  ✗ Not supported"
pub fn format_verdict(verdict: &SupportVerdict) -> String {
    let mark = if verdict.supported {
        format!("{} {}", "✓".green(), "Supported".green())
    } else {
        format!("{} {}", "✗".red(), "Not supported".red())
    };
    format!("{:<40} {}", verdict.codec.as_str(), mark)
}
