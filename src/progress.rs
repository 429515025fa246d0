//! Progress reporting for long-running steps

use async_trait::async_trait;

/// Receives human-readable status updates while the pipeline runs
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called with a one-line status message
    async fn on_message(&self, message: &str);
}

/// Discards all progress messages
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}
