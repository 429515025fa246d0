//! Merge planning - pure functions for creating merge plans
//!
//! No I/O happens here - all data is passed in, making it easy to unit test.

use crate::merge::message::{CommitMessagePlan, MessageInputs, compose_commit_message};
use crate::merge::method::MergeMethodDecision;
use crate::types::{CommitInfo, MergeMethod, MergeRequest, PullRequestSnapshot};

/// Merge plan - the functional core output
///
/// Created by `create_merge_plan()` (pure) and consumed once by
/// `execute_merge()` (effectful).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// PR number
    pub pr_number: u64,
    /// Head SHA the checks ran against; the merge is pinned to it
    pub expected_head_sha: String,
    /// Merge method and reason
    pub decision: MergeMethodDecision,
    /// Commit title and body
    pub message: CommitMessagePlan,
}

impl MergePlan {
    /// Merge strategy
    pub const fn method(&self) -> MergeMethod {
        self.decision.method
    }

    /// Request for the host's merge endpoint
    pub fn to_request(&self) -> MergeRequest {
        MergeRequest {
            pr_number: self.pr_number,
            method: self.decision.method,
            expected_head_sha: self.expected_head_sha.clone(),
            commit_title: self.message.title.clone(),
            commit_message: self.message.body.clone(),
        }
    }
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// # Arguments
/// * `snapshot` - Snapshot the checks passed against
/// * `decision` - Resolved merge method
/// * `actor` - User who issued the command
/// * `approval_overridden` - The override flag changed the approval outcome
/// * `commits` - PR commits oldest first (empty is fine for merge commits)
pub fn create_merge_plan(
    snapshot: &PullRequestSnapshot,
    decision: MergeMethodDecision,
    actor: &str,
    approval_overridden: bool,
    commits: &[CommitInfo],
) -> MergePlan {
    let message = compose_commit_message(
        decision.method,
        &MessageInputs {
            pr_number: snapshot.number,
            pr_title: &snapshot.title,
            head_ref: &snapshot.head_ref,
            actor,
            approval_overridden,
            commits,
        },
    );

    MergePlan {
        pr_number: snapshot.number,
        expected_head_sha: snapshot.head_sha.clone(),
        decision,
        message,
    }
}
