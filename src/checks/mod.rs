//! Merge checks
//!
//! Side-effect-free predicates plus the aggregation that turns them into a
//! single pass/fail gate. The only effectful piece is the approval
//! reconciler, which talks to the host to look up permissions and dismiss
//! stale approvals.

mod aggregate;
mod approvals;
mod title;

pub use aggregate::{
    APPROVAL_CHECK, CONVERSATIONS_CHECK, CheckInputs, CheckReport, MERGEABLE_CHECK, TITLE_CHECK,
    aggregate_checks,
};
pub use approvals::{ApprovalTally, PermissionCache, reconcile_approvals};
pub use title::{CONVENTIONAL_TYPES, is_conventional_title};

use crate::types::{
    AuthorAssociation, MergeableState, PermissionLevel, PrState, PullRequestSnapshot,
};

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Short check name shown in comments
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable explanation
    pub details: Option<String>,
    /// Failure is reported but does not block the merge
    pub optional: bool,
}

impl CheckResult {
    /// A required check
    pub fn required(name: &str, passed: bool, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            details: Some(details.into()),
            optional: false,
        }
    }

    /// A check whose failure is tolerated
    pub fn optional(name: &str, passed: bool, details: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(name, passed, details)
        }
    }

    /// Whether this result blocks the merge
    pub const fn is_blocking(&self) -> bool {
        !self.passed && !self.optional
    }
}

/// Whether the comment author's association may trigger a merge
pub const fn is_valid_author(association: &AuthorAssociation) -> bool {
    matches!(
        association,
        AuthorAssociation::Owner | AuthorAssociation::Member | AuthorAssociation::Collaborator
    )
}

/// Whether a permission level grants merge rights
pub const fn has_valid_permission(level: PermissionLevel) -> bool {
    matches!(
        level,
        PermissionLevel::Admin | PermissionLevel::Maintain | PermissionLevel::Write
    )
}

/// Human text for a `mergeable_state` code; unknown codes never fail
pub fn mergeable_state_description(state: &MergeableState) -> String {
    match state {
        MergeableState::Dirty => "merge conflicts must be resolved".to_string(),
        MergeableState::Blocked => "merging is blocked by branch protection rules".to_string(),
        MergeableState::Unstable => "some status checks are failing".to_string(),
        MergeableState::Behind => "the head branch is behind the base branch".to_string(),
        MergeableState::Unknown => "mergeability is still being computed".to_string(),
        MergeableState::HasHooks => "mergeable, pending pre-receive hooks".to_string(),
        MergeableState::Clean => "ready to merge".to_string(),
        MergeableState::Draft => "the pull request is a draft".to_string(),
        MergeableState::Other(code) => format!("unrecognized mergeable state `{code}`"),
    }
}

/// Name of the readiness check
pub const READY_CHECK: &str = "Pull request is ready";

/// Open, unlocked and not a draft; reports every failing condition
pub fn check_pr_readiness(snapshot: &PullRequestSnapshot) -> CheckResult {
    let mut reasons = Vec::new();
    if snapshot.state != PrState::Open {
        reasons.push("currently closed");
    }
    if snapshot.locked {
        reasons.push("currently locked");
    }
    if snapshot.draft {
        reasons.push("currently a draft");
    }

    if reasons.is_empty() {
        CheckResult::required(READY_CHECK, true, "open, unlocked, and ready for review")
    } else {
        CheckResult::required(READY_CHECK, false, reasons.join(", "))
    }
}
