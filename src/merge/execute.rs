//! Merge execution - effectful operations
//!
//! Takes a `MergePlan` and performs the protected merge:
//!
//! ```text
//! Validating -> AwaitingMergeability -> Merging -> { Merged, Aborted }
//! ```
//!
//! Every fresh snapshot is compared against the head SHA the checks ran
//! against; any difference aborts immediately. The merge call itself is
//! pinned to that SHA so the host rejects a last-instant push, and it is
//! issued at most once.

use crate::config::RetryPolicy;
use crate::error::Result;
use crate::merge::plan::MergePlan;
use crate::platform::HostService;
use crate::progress::ProgressCallback;
use crate::types::{Mergeability, MergeableState, PullRequestSnapshot, short_sha};
use tracing::{debug, info, warn};

/// Executor state, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    /// Re-fetching and comparing the head SHA
    Validating,
    /// Waiting for the host to compute mergeability
    AwaitingMergeability {
        /// Retry attempt (1-based)
        attempt: u32,
    },
    /// Merge call in flight
    Merging,
    /// Merge succeeded
    Merged,
    /// Stopped without merging
    Aborted,
}

/// Why the PR was judged not mergeable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotMergeableReason {
    /// Host was still computing after every retry
    StillPending {
        /// Retries spent
        retries: u32,
    },
    /// Host reported conflicts
    Conflicting,
    /// Mergeable but the state is not `clean`, or any other combination
    NotClean(MergeableState),
}

impl std::fmt::Display for NotMergeableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StillPending { retries } => {
                write!(f, "mergeability still pending after {retries} retries")
            }
            Self::Conflicting => write!(f, "merge conflicts"),
            Self::NotClean(state) => write!(f, "mergeable state `{state}`"),
        }
    }
}

/// Result of merge execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeExecutionResult {
    /// Merge commit created
    Merged {
        /// Merge commit SHA, when the host reports one
        sha: Option<String>,
    },
    /// New commits arrived after the checks ran
    HeadChanged {
        /// SHA the checks ran against
        expected: String,
        /// SHA found on re-fetch
        actual: String,
    },
    /// Final gate refused to merge
    NotMergeable(NotMergeableReason),
    /// Host rejected the merge call
    MergeFailed {
        /// Host error text, verbatim
        message: String,
    },
}

impl MergeExecutionResult {
    /// Check if the PR was merged
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}

fn head_changed(plan: &MergePlan, snapshot: &PullRequestSnapshot) -> Option<MergeExecutionResult> {
    (snapshot.head_sha != plan.expected_head_sha).then(|| MergeExecutionResult::HeadChanged {
        expected: plan.expected_head_sha.clone(),
        actual: snapshot.head_sha.clone(),
    })
}

fn transition(pr_number: u64, phase: ExecutionPhase) {
    debug!(pr_number, ?phase, "merge executor transition");
}

/// Execute the merge plan (EFFECTFUL)
///
/// Host errors while re-fetching propagate; everything else resolves to a
/// [`MergeExecutionResult`].
pub async fn execute_merge(
    plan: &MergePlan,
    host: &dyn HostService,
    retry: &RetryPolicy,
    progress: &dyn ProgressCallback,
) -> Result<MergeExecutionResult> {
    let pr_number = plan.pr_number;
    transition(pr_number, ExecutionPhase::Validating);

    let mut snapshot = host.get_pull_request(pr_number).await?;
    if let Some(changed) = head_changed(plan, &snapshot) {
        warn!(pr_number, expected = %plan.expected_head_sha, actual = %snapshot.head_sha, "head moved after checks");
        transition(pr_number, ExecutionPhase::Aborted);
        return Ok(changed);
    }

    let mut attempt = 0;
    while snapshot.mergeable.is_pending() && attempt < retry.max_retries {
        attempt += 1;
        transition(pr_number, ExecutionPhase::AwaitingMergeability { attempt });
        progress
            .on_message(&format!(
                "⏳ Waiting for mergeability of PR #{pr_number} (attempt {attempt}/{})",
                retry.max_retries
            ))
            .await;
        tokio::time::sleep(retry.interval).await;

        snapshot = host.get_pull_request(pr_number).await?;
        if let Some(changed) = head_changed(plan, &snapshot) {
            warn!(pr_number, attempt, actual = %snapshot.head_sha, "head moved while waiting for mergeability");
            transition(pr_number, ExecutionPhase::Aborted);
            return Ok(changed);
        }
    }

    let refusal = match snapshot.mergeable {
        Mergeability::Mergeable if snapshot.mergeable_state.is_clean() => None,
        Mergeability::Pending => Some(NotMergeableReason::StillPending { retries: attempt }),
        Mergeability::Conflicting => Some(NotMergeableReason::Conflicting),
        Mergeability::Mergeable => Some(NotMergeableReason::NotClean(
            snapshot.mergeable_state.clone(),
        )),
    };
    if let Some(reason) = refusal {
        info!(pr_number, ?reason, "PR not mergeable");
        transition(pr_number, ExecutionPhase::Aborted);
        return Ok(MergeExecutionResult::NotMergeable(reason));
    }

    transition(pr_number, ExecutionPhase::Merging);
    progress
        .on_message(&format!(
            "🔀 Merging PR #{pr_number} ({}) at {}",
            plan.method(),
            short_sha(&plan.expected_head_sha)
        ))
        .await;

    let result = match host.merge_pull_request(&plan.to_request()).await {
        Ok(merge_result) if merge_result.merged => {
            let sha_display = merge_result.sha.as_deref().unwrap_or("(no sha)");
            progress.on_message(&format!("✅ Merged: {sha_display}")).await;
            transition(pr_number, ExecutionPhase::Merged);
            MergeExecutionResult::Merged {
                sha: merge_result.sha,
            }
        }
        Ok(merge_result) => {
            // Merge API returned but didn't merge
            transition(pr_number, ExecutionPhase::Aborted);
            MergeExecutionResult::MergeFailed {
                message: merge_result
                    .message
                    .unwrap_or_else(|| "merge was not performed".to_string()),
            }
        }
        Err(e) => {
            transition(pr_number, ExecutionPhase::Aborted);
            MergeExecutionResult::MergeFailed {
                message: e.to_string(),
            }
        }
    };

    Ok(result)
}
