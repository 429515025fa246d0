//! Check aggregation - pure, testable gate decision

use super::approvals::ApprovalTally;
use super::{CheckResult, check_pr_readiness, mergeable_state_description};
use crate::types::PullRequestSnapshot;

/// Name of the conversation check
pub const CONVERSATIONS_CHECK: &str = "Conversations resolved";
/// Name of the approval check
pub const APPROVAL_CHECK: &str = "Approved";
/// Name of the mergeable-state check
pub const MERGEABLE_CHECK: &str = "Mergeable state";
/// Name of the title check
pub const TITLE_CHECK: &str = "Conventional title";

/// Everything gathered before the gate decision
#[derive(Debug, Clone, Copy)]
pub struct CheckInputs<'a> {
    /// Snapshot the checks run against
    pub snapshot: &'a PullRequestSnapshot,
    /// Unresolved review threads
    pub unresolved_threads: usize,
    /// Approval reconciliation result
    pub approvals: &'a ApprovalTally,
    /// Result of the conventional title check
    pub conventional_title: bool,
    /// `--override-approval` was supplied
    pub override_approval: bool,
}

/// Ordered check results plus the derived gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Results in fixed order: readiness, conversations, approval,
    /// mergeable state, title
    pub results: Vec<CheckResult>,
    /// The override flag turned a failing approval check into a tolerated one
    pub approval_overridden: bool,
}

impl CheckReport {
    /// The gate: every required check passed
    pub fn passed(&self) -> bool {
        !self.results.iter().any(CheckResult::is_blocking)
    }

    /// Checks that block the merge
    pub fn blocking(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.is_blocking())
    }
}

/// Run every check and derive the gate (PURE)
pub fn aggregate_checks(inputs: &CheckInputs<'_>) -> CheckReport {
    let snapshot = inputs.snapshot;
    let mut results = Vec::with_capacity(5);

    results.push(check_pr_readiness(snapshot));

    results.push(match inputs.unresolved_threads {
        0 => CheckResult::required(CONVERSATIONS_CHECK, true, "all conversations are resolved"),
        n => CheckResult::required(
            CONVERSATIONS_CHECK,
            false,
            format!("{n} unresolved conversation{}", plural(n)),
        ),
    });

    let valid = inputs.approvals.valid_approvals;
    let approval_overridden = valid == 0 && inputs.override_approval;
    results.push(if valid > 0 {
        CheckResult::required(
            APPROVAL_CHECK,
            true,
            format!("{valid} valid approval{}", plural(valid)),
        )
    } else if approval_overridden {
        CheckResult::optional(
            APPROVAL_CHECK,
            false,
            "no valid approvals (requirement overridden with --override-approval)",
        )
    } else {
        CheckResult::required(
            APPROVAL_CHECK,
            false,
            "no valid approvals on the current head from reviewers with write access",
        )
    });

    results.push(if snapshot.mergeable_state.is_clean() {
        CheckResult::required(
            MERGEABLE_CHECK,
            true,
            mergeable_state_description(&snapshot.mergeable_state),
        )
    } else if snapshot.mergeable.is_pending() {
        // Resolved by the executor's retry loop
        CheckResult::required(
            MERGEABLE_CHECK,
            true,
            "mergeability is still being computed and will be re-checked before merging",
        )
    } else {
        CheckResult::required(
            MERGEABLE_CHECK,
            false,
            mergeable_state_description(&snapshot.mergeable_state),
        )
    });

    results.push(if inputs.conventional_title {
        CheckResult::optional(TITLE_CHECK, true, "title follows Conventional Commits")
    } else {
        CheckResult::optional(
            TITLE_CHECK,
            false,
            "title does not follow Conventional Commits (`type(scope): description`)",
        )
    });

    CheckReport {
        results,
        approval_overridden,
    }
}

const fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
