//! Terminal styling helpers

use owo_colors::{OwoColorize, Style};
use std::fmt::Display;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Cross used in summaries
pub const CROSS: &str = "✗";

/// Semantic styles for terminal output
pub trait Stylize: Display + Sized {
    /// Highlighted value (branch names, numbers)
    fn accent(&self) -> String {
        self.style(Style::new().cyan()).to_string()
    }

    /// Bold emphasis
    fn emphasis(&self) -> String {
        self.style(Style::new().bold()).to_string()
    }

    /// Dimmed secondary text
    fn muted(&self) -> String {
        self.style(Style::new().dimmed()).to_string()
    }

    /// Positive outcome
    fn success(&self) -> String {
        self.style(Style::new().green()).to_string()
    }

    /// Warning / failure
    fn warn(&self) -> String {
        self.style(Style::new().yellow()).to_string()
    }

    /// Hard failure
    fn error(&self) -> String {
        self.style(Style::new().red().bold()).to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Red cross
pub fn cross() -> String {
    CROSS.error()
}
