//! Host services for pull request operations
//!
//! Provides the interface the merge pipeline uses to talk to the
//! repository host.

mod github;

pub use github::{DEFAULT_API_URL, GitHubService};

use crate::error::Result;
use crate::types::{
    CommitInfo, MergeRequest, MergeResult, PermissionLevel, PullRequestSnapshot,
    Reaction, Review,
};
use async_trait::async_trait;

/// Host service trait for pull request operations
///
/// Every method is awaited to completion before the pipeline moves on;
/// implementations need not support concurrent use from one run.
#[async_trait]
pub trait HostService: Send + Sync {
    /// Fetch a fresh snapshot of a PR
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequestSnapshot>;

    /// List all reviews in the `APPROVED` state (all pages)
    async fn list_approved_reviews(&self, pr_number: u64) -> Result<Vec<Review>>;

    /// Dismiss a review with a message
    ///
    /// Returns `false` instead of an error when the host refuses.
    async fn dismiss_review(&self, pr_number: u64, review_id: u64, message: &str) -> bool;

    /// List the commits of a PR, oldest first (all pages)
    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<CommitInfo>>;

    /// Count review threads that are not resolved (all pages)
    async fn count_unresolved_threads(&self, pr_number: u64) -> Result<usize>;

    /// Look up a user's permission on the repository
    ///
    /// Lookup failures yield [`PermissionLevel::None`], never an error.
    async fn get_permission(&self, login: &str) -> PermissionLevel;

    /// Create a comment on a PR
    async fn create_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Add a reaction to an issue comment
    async fn add_reaction(&self, comment_id: u64, reaction: Reaction) -> Result<()>;

    /// Merge a PR, guarded by `request.expected_head_sha`
    async fn merge_pull_request(&self, request: &MergeRequest) -> Result<MergeResult>;
}
