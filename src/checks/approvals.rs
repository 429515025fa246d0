//! Approval reconciliation
//!
//! Counts approvals that are still valid for the current head commit and
//! dismisses approvals left on older commits so the host's own branch
//! protection state agrees with ours.

use crate::error::Result;
use crate::platform::HostService;
use crate::types::{PermissionLevel, PullRequestSnapshot, short_sha};
use std::collections::HashMap;
use tracing::{debug, info};

use super::has_valid_permission;

/// Per-run cache of permission lookups, keyed by login
#[derive(Debug, Clone, Default)]
pub struct PermissionCache {
    levels: HashMap<String, PermissionLevel>,
}

impl PermissionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `login`, hitting the host at most once per login
    pub async fn get(&mut self, host: &dyn HostService, login: &str) -> PermissionLevel {
        if let Some(level) = self.levels.get(login) {
            return *level;
        }
        let level = host.get_permission(login).await;
        self.levels.insert(login.to_string(), level);
        level
    }
}

/// Result of reconciling approvals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalTally {
    /// Approvals from eligible reviewers on the current head
    pub valid_approvals: usize,
    /// One line per stale approval the host refused to dismiss
    pub dismissal_failures: Vec<String>,
}

/// Fetch approvals and classify them against `snapshot`
///
/// A review counts when the reviewer is not the PR author, still exists,
/// holds write access or better, and reviewed the current head SHA.
/// Eligible approvals on any other commit are dismissed and never counted,
/// whether or not the dismissal succeeds.
pub async fn reconcile_approvals(
    host: &dyn HostService,
    snapshot: &PullRequestSnapshot,
    permissions: &mut PermissionCache,
) -> Result<ApprovalTally> {
    let reviews = host.list_approved_reviews(snapshot.number).await?;
    let mut tally = ApprovalTally::default();

    for review in reviews {
        let Some(reviewer) = review.reviewer.as_deref() else {
            debug!(review_id = review.id, "skipping approval from deleted account");
            continue;
        };
        if reviewer == snapshot.author {
            debug!(review_id = review.id, reviewer, "skipping self-approval");
            continue;
        }

        let level = permissions.get(host, reviewer).await;
        if !has_valid_permission(level) {
            debug!(review_id = review.id, reviewer, %level, "skipping approval without write access");
            continue;
        }

        if review.commit_id.as_deref() != Some(snapshot.head_sha.as_str()) {
            let reviewed = review.commit_id.as_deref().map_or("unknown", short_sha);
            let message = format!(
                "Approval was for `{reviewed}` but the head is now `{}`. Please re-review the latest changes.",
                snapshot.short_sha()
            );
            if host
                .dismiss_review(snapshot.number, review.id, &message)
                .await
            {
                info!(review_id = review.id, reviewer, reviewed, "dismissed stale approval");
            } else {
                tally.dismissal_failures.push(format!(
                    "@{reviewer} approved `{reviewed}` (current head `{}`)",
                    snapshot.short_sha()
                ));
            }
            continue;
        }

        tally.valid_approvals += 1;
    }

    debug!(
        pr_number = snapshot.number,
        valid = tally.valid_approvals,
        failed = tally.dismissal_failures.len(),
        "reconciled approvals"
    );
    Ok(tally)
}
