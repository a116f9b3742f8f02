//! Terminal styling helpers for CLI output

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Extension trait for consistent output styling
pub trait Stylize {
    /// De-emphasized text (hints, secondary info)
    fn muted(&self) -> String;
    /// Highlighted values (names, numbers, shas)
    fn accent(&self) -> String;
    /// Successful outcomes
    fn success(&self) -> String;
    /// Warnings and soft failures
    fn warn(&self) -> String;
    /// Section headings and key phrases
    fn emphasis(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn muted(&self) -> String {
        format!("{}", self.dimmed())
    }

    fn accent(&self) -> String {
        format!("{}", self.cyan())
    }

    fn success(&self) -> String {
        format!("{}", self.green())
    }

    fn warn(&self) -> String {
        format!("{}", self.yellow())
    }

    fn emphasis(&self) -> String {
        format!("{}", self.bold())
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Spinner style for long-running operations
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Render a clickable link when the terminal supports it
pub fn link(text: &str, url: &str) -> String {
    if supports_hyperlinks::supports_hyperlinks() {
        terminal_link::Link::new(text, url).to_string()
    } else {
        format!("{text} ({url})")
    }
}
