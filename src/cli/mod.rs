//! CLI commands for merge-gate

mod context;
mod run;
pub mod style;

pub use run::{RunOptions, run_command};

use async_trait::async_trait;
use merge_gate::progress::ProgressCallback;
use style::Stylize;

/// Progress reporter that prints to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress {
    quiet: bool,
}

impl CliProgress {
    /// Print every message
    pub const fn verbose() -> Self {
        Self { quiet: false }
    }

    /// Print nothing
    pub const fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        if !self.quiet {
            anstream::eprintln!("{}", message.muted());
        }
    }
}
