//! Mock host service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use merge_gate::error::{Error, Result};
use merge_gate::platform::HostService;
use merge_gate::types::{
    CommitInfo, MergeRequest, MergeResult, PermissionLevel, PullRequestSnapshot, Reaction, Review,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Call record for `create_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `add_reaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCall {
    pub comment_id: u64,
    pub reaction: Reaction,
}

/// Call record for `dismiss_review`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissCall {
    pub pr_number: u64,
    pub review_id: u64,
    pub message: String,
}

/// Simple mock host service for testing
///
/// Manually implements `HostService` so call order and counts can be
/// inspected directly.
///
/// Features:
/// - Scripted snapshot sequence (the last one repeats)
/// - Per-login permissions and per-review dismissal results
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockHostService {
    snapshots: Mutex<VecDeque<PullRequestSnapshot>>,
    reviews: Mutex<Vec<Review>>,
    permissions: Mutex<HashMap<String, PermissionLevel>>,
    dismiss_results: Mutex<HashMap<u64, bool>>,
    commits: Mutex<Vec<CommitInfo>>,
    unresolved_threads: Mutex<usize>,
    merge_response: Mutex<MergeResult>,
    // Call tracking
    get_pull_request_calls: Mutex<u32>,
    permission_calls: Mutex<Vec<String>>,
    dismiss_calls: Mutex<Vec<DismissCall>>,
    list_commits_calls: Mutex<Vec<u64>>,
    comment_calls: Mutex<Vec<CreateCommentCall>>,
    reaction_calls: Mutex<Vec<ReactionCall>>,
    merge_calls: Mutex<Vec<MergeRequest>>,
    // Error injection
    error_on_get_pull_request: Mutex<Option<String>>,
    error_on_list_reviews: Mutex<Option<String>>,
    error_on_list_commits: Mutex<Option<String>>,
    error_on_threads: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
}

impl MockHostService {
    /// Create a new mock serving a single snapshot
    pub fn new(snapshot: PullRequestSnapshot) -> Self {
        Self {
            snapshots: Mutex::new(VecDeque::from([snapshot])),
            reviews: Mutex::new(Vec::new()),
            permissions: Mutex::new(HashMap::new()),
            dismiss_results: Mutex::new(HashMap::new()),
            commits: Mutex::new(Vec::new()),
            unresolved_threads: Mutex::new(0),
            merge_response: Mutex::new(MergeResult {
                merged: true,
                sha: Some("merge_sha_0123456789".to_string()),
                message: None,
            }),
            get_pull_request_calls: Mutex::new(0),
            permission_calls: Mutex::new(Vec::new()),
            dismiss_calls: Mutex::new(Vec::new()),
            list_commits_calls: Mutex::new(Vec::new()),
            comment_calls: Mutex::new(Vec::new()),
            reaction_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            error_on_get_pull_request: Mutex::new(None),
            error_on_list_reviews: Mutex::new(None),
            error_on_list_commits: Mutex::new(None),
            error_on_threads: Mutex::new(None),
            error_on_merge: Mutex::new(None),
        }
    }

    // === Response setup ===

    /// Replace the snapshot sequence; each fetch pops one, the last repeats
    pub fn set_snapshots(&self, snapshots: Vec<PullRequestSnapshot>) {
        assert!(!snapshots.is_empty(), "at least one snapshot is required");
        *self.snapshots.lock().unwrap() = snapshots.into();
    }

    /// Set the approved reviews
    pub fn set_reviews(&self, reviews: Vec<Review>) {
        *self.reviews.lock().unwrap() = reviews;
    }

    /// Set a user's permission (unset users have `None`)
    pub fn set_permission(&self, login: &str, level: PermissionLevel) {
        self.permissions
            .lock()
            .unwrap()
            .insert(login.to_string(), level);
    }

    /// Make dismissing `review_id` fail
    pub fn refuse_dismissal(&self, review_id: u64) {
        self.dismiss_results.lock().unwrap().insert(review_id, false);
    }

    /// Set the PR commits
    pub fn set_commits(&self, commits: Vec<CommitInfo>) {
        *self.commits.lock().unwrap() = commits;
    }

    /// Set the unresolved thread count
    pub fn set_unresolved_threads(&self, count: usize) {
        *self.unresolved_threads.lock().unwrap() = count;
    }

    /// Set the merge response
    pub fn set_merge_response(&self, result: MergeResult) {
        *self.merge_response.lock().unwrap() = result;
    }

    // === Error injection methods ===

    /// Make `get_pull_request` return an error
    pub fn fail_get_pull_request(&self, msg: &str) {
        *self.error_on_get_pull_request.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_approved_reviews` return an error
    pub fn fail_list_reviews(&self, msg: &str) {
        *self.error_on_list_reviews.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_pr_commits` return an error
    pub fn fail_list_commits(&self, msg: &str) {
        *self.error_on_list_commits.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `count_unresolved_threads` return an error
    pub fn fail_threads(&self, msg: &str) {
        *self.error_on_threads.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pull_request` return an error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Number of `get_pull_request` calls
    pub fn get_pull_request_count(&self) -> u32 {
        *self.get_pull_request_calls.lock().unwrap()
    }

    /// Logins passed to `get_permission`
    pub fn get_permission_calls(&self) -> Vec<String> {
        self.permission_calls.lock().unwrap().clone()
    }

    /// All `dismiss_review` calls
    pub fn get_dismiss_calls(&self) -> Vec<DismissCall> {
        self.dismiss_calls.lock().unwrap().clone()
    }

    /// All `list_pr_commits` calls
    pub fn get_list_commits_calls(&self) -> Vec<u64> {
        self.list_commits_calls.lock().unwrap().clone()
    }

    /// All `create_comment` calls
    pub fn get_comment_calls(&self) -> Vec<CreateCommentCall> {
        self.comment_calls.lock().unwrap().clone()
    }

    /// All `add_reaction` calls
    pub fn get_reaction_calls(&self) -> Vec<ReactionCall> {
        self.reaction_calls.lock().unwrap().clone()
    }

    /// All `merge_pull_request` calls
    pub fn get_merge_calls(&self) -> Vec<MergeRequest> {
        self.merge_calls.lock().unwrap().clone()
    }

    /// Assert that exactly one comment contains `needle`
    pub fn assert_comment_contains(&self, needle: &str) {
        let calls = self.get_comment_calls();
        assert!(
            calls.iter().any(|c| c.body.contains(needle)),
            "Expected a comment containing {needle:?} but got: {calls:?}"
        );
    }

    /// Assert the reactions added, in order
    pub fn assert_reactions(&self, expected: &[Reaction]) {
        let actual: Vec<Reaction> = self
            .get_reaction_calls()
            .into_iter()
            .map(|c| c.reaction)
            .collect();
        assert_eq!(actual, expected, "unexpected reactions");
    }

    /// Assert that `merge_pull_request` was called once
    pub fn assert_merged_once(&self) {
        let calls = self.get_merge_calls();
        assert_eq!(calls.len(), 1, "Expected one merge call but got: {calls:?}");
    }

    /// Assert that `merge_pull_request` was NOT called
    pub fn assert_merge_not_called(&self) {
        let calls = self.get_merge_calls();
        assert!(
            calls.is_empty(),
            "Expected merge NOT to be called but it was: {calls:?}"
        );
    }
}

fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
    slot.lock()
        .unwrap()
        .as_ref()
        .map_or(Ok(()), |msg| Err(Error::GitHubApi(msg.clone())))
}

#[async_trait]
impl HostService for MockHostService {
    async fn get_pull_request(&self, _pr_number: u64) -> Result<PullRequestSnapshot> {
        *self.get_pull_request_calls.lock().unwrap() += 1;
        injected(&self.error_on_get_pull_request)?;

        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            Ok(snapshots.pop_front().unwrap())
        } else {
            Ok(snapshots.front().cloned().unwrap())
        }
    }

    async fn list_approved_reviews(&self, _pr_number: u64) -> Result<Vec<Review>> {
        injected(&self.error_on_list_reviews)?;
        Ok(self.reviews.lock().unwrap().clone())
    }

    async fn dismiss_review(&self, pr_number: u64, review_id: u64, message: &str) -> bool {
        self.dismiss_calls.lock().unwrap().push(DismissCall {
            pr_number,
            review_id,
            message: message.to_string(),
        });
        self.dismiss_results
            .lock()
            .unwrap()
            .get(&review_id)
            .copied()
            .unwrap_or(true)
    }

    async fn list_pr_commits(&self, pr_number: u64) -> Result<Vec<CommitInfo>> {
        self.list_commits_calls.lock().unwrap().push(pr_number);
        injected(&self.error_on_list_commits)?;
        Ok(self.commits.lock().unwrap().clone())
    }

    async fn count_unresolved_threads(&self, _pr_number: u64) -> Result<usize> {
        injected(&self.error_on_threads)?;
        Ok(*self.unresolved_threads.lock().unwrap())
    }

    async fn get_permission(&self, login: &str) -> PermissionLevel {
        self.permission_calls.lock().unwrap().push(login.to_string());
        self.permissions
            .lock()
            .unwrap()
            .get(login)
            .copied()
            .unwrap_or(PermissionLevel::None)
    }

    async fn create_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.comment_calls.lock().unwrap().push(CreateCommentCall {
            pr_number,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn add_reaction(&self, comment_id: u64, reaction: Reaction) -> Result<()> {
        self.reaction_calls.lock().unwrap().push(ReactionCall {
            comment_id,
            reaction,
        });
        Ok(())
    }

    async fn merge_pull_request(&self, request: &MergeRequest) -> Result<MergeResult> {
        self.merge_calls.lock().unwrap().push(request.clone());
        injected(&self.error_on_merge)?;
        Ok(self.merge_response.lock().unwrap().clone())
    }
}
