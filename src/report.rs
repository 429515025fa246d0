//! PR comment rendering
//!
//! Every comment uses the same icon vocabulary: ✅ passed, ❌ blocking
//! failure, ⚠️ tolerated failure or warning.

use crate::checks::{CheckResult, mergeable_state_description};
use crate::merge::{MergePlan, NotMergeableReason};
use crate::types::short_sha;

/// Status icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    /// ✅
    Pass,
    /// ❌
    Fail,
    /// ⚠️
    Warn,
    /// ℹ️
    Info,
}

impl Icon {
    /// Emoji for this icon
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Fail => "❌",
            Self::Warn => "⚠️",
            Self::Info => "ℹ️",
        }
    }

    /// Icon for a check result
    pub const fn for_check(result: &CheckResult) -> Self {
        match (result.passed, result.optional) {
            (true, _) => Self::Pass,
            (false, true) => Self::Warn,
            (false, false) => Self::Fail,
        }
    }
}

impl std::fmt::Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bullet per check, in order
pub fn render_check_list(results: &[CheckResult]) -> String {
    results
        .iter()
        .map(|r| {
            let icon = Icon::for_check(r);
            match r.details.as_deref() {
                Some(details) => format!("- {icon} **{}**: {details}", r.name),
                None => format!("- {icon} **{}**", r.name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Gate failed
pub fn render_checks_failed(results: &[CheckResult], trigger: &str) -> String {
    format!(
        "### {} Merge checks failed\n\n{}\n\nFix the failing checks and comment `{trigger}` again.",
        Icon::Fail,
        render_check_list(results)
    )
}

/// Some stale approvals could not be dismissed
pub fn render_dismissal_warning(failures: &[String]) -> String {
    let lines: Vec<String> = failures.iter().map(|f| format!("- {f}")).collect();
    format!(
        "### {} Could not dismiss stale approvals\n\nThese approvals were left on older commits and are not counted:\n\n{}",
        Icon::Warn,
        lines.join("\n")
    )
}

/// Commenter lacks rights
pub fn render_unauthorized(actor: &str) -> String {
    format!(
        "{} @{actor} is not allowed to merge this pull request. Merging requires write, maintain, or admin access.",
        Icon::Fail
    )
}

/// Comment looked like the trigger but did not parse
pub fn render_unrecognized(text: &str, usage: &str) -> String {
    format!(
        "{} Unrecognized command `{}`. Usage: {usage}",
        Icon::Warn,
        text.replace('`', "'")
    )
}

/// PR was merged before this run
pub fn render_already_merged() -> String {
    format!("{} This pull request is already merged.", Icon::Info)
}

/// New commits after the checks ran
pub fn render_head_changed(expected: &str, actual: &str, trigger: &str) -> String {
    format!(
        "{} Merge aborted: new commits were pushed after the checks ran (`{}` → `{}`). Review the new commits and comment `{trigger}` again.",
        Icon::Fail,
        short_sha(expected),
        short_sha(actual)
    )
}

/// Final gate refused
pub fn render_not_mergeable(reason: &NotMergeableReason) -> String {
    let detail = match reason {
        NotMergeableReason::StillPending { retries } => format!(
            "GitHub was still computing mergeability after {retries} retr{}. Try again in a moment.",
            if *retries == 1 { "y" } else { "ies" }
        ),
        NotMergeableReason::Conflicting => {
            "the pull request has merge conflicts with its base branch.".to_string()
        }
        NotMergeableReason::NotClean(state) => format!(
            "the pull request is not mergeable ({}).",
            mergeable_state_description(state)
        ),
    };
    format!("{} Merge aborted: {detail}", Icon::Fail)
}

/// Host rejected the merge call
pub fn render_merge_failed(message: &str) -> String {
    format!("{} Merge failed: {message}", Icon::Fail)
}

/// Merge succeeded
pub fn render_merged(plan: &MergePlan, sha: Option<&str>, results: &[CheckResult]) -> String {
    let commit = sha.map_or_else(String::new, |s| format!(" as `{}`", short_sha(s)));
    format!(
        "{} Merged with **{}**{commit} ({}).\n\n{}",
        Icon::Pass,
        plan.method(),
        plan.decision.reason,
        render_check_list(results)
    )
}

/// A host call failed mid-pipeline
pub fn render_host_error(action: &str, error: &str) -> String {
    format!("{} Merge aborted: could not {action}: {error}", Icon::Fail)
}
