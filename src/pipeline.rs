//! Merge command pipeline
//!
//! Drives one merge attempt from a trigger event to one of four outcomes.
//! Soft failures are explained in a PR comment and returned as
//! [`MergeOutcome::Failed`]; nothing here is retried except the
//! mergeability wait inside the executor.

use crate::checks::{
    CheckInputs, CheckReport, PermissionCache, aggregate_checks, has_valid_permission,
    is_conventional_title, is_valid_author, reconcile_approvals,
};
use crate::config::MergeConfig;
use crate::error::Result;
use crate::merge::{MergeExecutionResult, create_merge_plan, execute_merge, resolve_merge_method};
use crate::platform::HostService;
use crate::progress::ProgressCallback;
use crate::report;
use crate::trigger::{CommandParse, MergeCommand, TriggerEvent, command_usage, parse_command};
use crate::types::{MergeMethod, PullRequestSnapshot, Reaction};
use tracing::{debug, info, warn};

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// PR was merged by this run
    Merged {
        /// Strategy used
        method: MergeMethod,
        /// Merge commit SHA, when reported
        sha: Option<String>,
    },
    /// Nothing to do (not a command, bot, not a PR, unrecognized)
    Skipped,
    /// Checks or the merge failed
    Failed,
    /// PR was already merged
    AlreadyMerged,
}

impl MergeOutcome {
    /// Stable identifier for workflow outputs
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Merged { .. } => "merged",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::AlreadyMerged => "already-merged",
        }
    }

    /// Merge method, when merged
    pub const fn method(&self) -> Option<MergeMethod> {
        match self {
            Self::Merged { method, .. } => Some(*method),
            _ => None,
        }
    }
}

impl std::fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome plus a one-line explanation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Final outcome
    pub outcome: MergeOutcome,
    /// Human-readable summary
    pub message: String,
}

impl PipelineReport {
    fn new(outcome: MergeOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }

    fn skipped(message: impl Into<String>) -> Self {
        Self::new(MergeOutcome::Skipped, message)
    }

    fn failed(message: impl Into<String>) -> Self {
        Self::new(MergeOutcome::Failed, message)
    }
}

/// Post a comment; failures are logged and otherwise ignored
async fn post(host: &dyn HostService, pr_number: u64, body: &str) {
    if let Err(e) = host.create_comment(pr_number, body).await {
        warn!(pr_number, error = %e, "failed to post comment");
    }
}

/// Add a reaction; it may already exist, so failures are ignored
async fn react(host: &dyn HostService, comment_id: u64, reaction: Reaction) {
    if let Err(e) = host.add_reaction(comment_id, reaction).await {
        debug!(comment_id, error = %e, "ignoring reaction failure");
    }
}

/// Post a host-error comment and build the failed report
async fn host_failure(host: &dyn HostService, pr_number: u64, action: &str, error: &str) -> PipelineReport {
    warn!(pr_number, action, error, "host call failed");
    post(host, pr_number, &report::render_host_error(action, error)).await;
    PipelineReport::failed(format!("could not {action}: {error}"))
}

/// Run the merge pipeline for one trigger event
///
/// Host failures are explained on the PR and reported as
/// [`MergeOutcome::Failed`] rather than returned as errors.
pub async fn run_merge_command(
    event: &TriggerEvent,
    config: &MergeConfig,
    host: &dyn HostService,
    progress: &dyn ProgressCallback,
) -> Result<PipelineReport> {
    let pr_number = event.pr_number;

    if !event.is_pull_request {
        debug!(pr_number, "comment is not on a pull request");
        return Ok(PipelineReport::skipped("comment is not on a pull request"));
    }

    if event.actor.is_bot() {
        debug!(pr_number, actor = %event.actor.login, "ignoring comment from bot");
        return Ok(PipelineReport::skipped("comment posted by a bot"));
    }

    let command = match parse_command(&event.body, &config.command) {
        CommandParse::NotCommand => {
            debug!(pr_number, "comment is not a merge command");
            return Ok(PipelineReport::skipped("comment is not a merge command"));
        }
        CommandParse::Unrecognized { text } => {
            info!(pr_number, %text, "unrecognized merge command");
            react(host, event.comment_id, Reaction::Confused).await;
            post(
                host,
                pr_number,
                &report::render_unrecognized(&text, &command_usage(&config.command)),
            )
            .await;
            return Ok(PipelineReport::skipped(format!(
                "unrecognized command `{text}`"
            )));
        }
        CommandParse::Command(command) => command,
    };

    info!(pr_number, actor = %event.actor.login, override_approval = command.override_approval, "merge command received");
    react(host, event.comment_id, Reaction::Eyes).await;

    let mut permissions = PermissionCache::new();
    let authorized = is_valid_author(&event.author_association)
        && has_valid_permission(permissions.get(host, &event.actor.login).await);
    if !authorized {
        info!(pr_number, actor = %event.actor.login, association = %event.author_association, "actor not authorized");
        post(host, pr_number, &report::render_unauthorized(&event.actor.login)).await;
        return Ok(PipelineReport::failed(format!(
            "@{} is not authorized to merge",
            event.actor.login
        )));
    }

    let snapshot = match host.get_pull_request(pr_number).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return Ok(host_failure(host, pr_number, "fetch the pull request", &e.to_string()).await);
        }
    };
    debug!(
        pr_number,
        head = %snapshot.head_ref,
        base = %snapshot.base_ref,
        is_fork = snapshot.is_fork,
        "fetched pull request"
    );
    if snapshot.merged {
        info!(pr_number, "PR already merged");
        post(host, pr_number, &report::render_already_merged()).await;
        return Ok(PipelineReport::new(
            MergeOutcome::AlreadyMerged,
            "pull request is already merged",
        ));
    }

    let checks = match run_checks(host, &snapshot, command, &mut permissions).await {
        Ok(checks) => checks,
        Err(failure) => return Ok(failure),
    };
    if !checks.passed() {
        let failed: Vec<&str> = checks.blocking().map(|r| r.name.as_str()).collect();
        info!(pr_number, ?failed, "merge checks failed");
        post(
            host,
            pr_number,
            &report::render_checks_failed(&checks.results, &config.command),
        )
        .await;
        return Ok(PipelineReport::failed(format!(
            "merge checks failed: {}",
            failed.join(", ")
        )));
    }
    if checks.approval_overridden {
        warn!(pr_number, actor = %event.actor.login, "merging without approval (override)");
    }

    let decision = resolve_merge_method(
        &snapshot.head_ref,
        &snapshot.base_ref,
        &config.branch_policy(),
    );
    info!(pr_number, method = %decision.method, reason = %decision.reason, "resolved merge method");

    let commits = if decision.method == MergeMethod::Squash {
        match host.list_pr_commits(pr_number).await {
            Ok(commits) => commits,
            Err(e) => {
                return Ok(host_failure(host, pr_number, "list commits", &e.to_string()).await);
            }
        }
    } else {
        Vec::new()
    };

    let plan = create_merge_plan(
        &snapshot,
        decision,
        &event.actor.login,
        checks.approval_overridden,
        &commits,
    );

    let execution = match execute_merge(&plan, host, &config.retry_policy(), progress).await {
        Ok(execution) => execution,
        Err(e) => {
            return Ok(host_failure(host, pr_number, "re-check the pull request", &e.to_string()).await);
        }
    };

    let result = match execution {
        MergeExecutionResult::Merged { sha } => {
            info!(pr_number, method = %plan.method(), sha = ?sha, "merged");
            react(host, event.comment_id, Reaction::Rocket).await;
            post(
                host,
                pr_number,
                &report::render_merged(&plan, sha.as_deref(), &checks.results),
            )
            .await;
            PipelineReport::new(
                MergeOutcome::Merged {
                    method: plan.method(),
                    sha,
                },
                format!("merged with {}", plan.method()),
            )
        }
        MergeExecutionResult::HeadChanged { expected, actual } => {
            post(
                host,
                pr_number,
                &report::render_head_changed(&expected, &actual, &config.command),
            )
            .await;
            PipelineReport::failed("new commits detected after checks; merge aborted")
        }
        MergeExecutionResult::NotMergeable(reason) => {
            let body = report::render_not_mergeable(&reason);
            post(host, pr_number, &body).await;
            PipelineReport::failed(format!("not mergeable: {reason}"))
        }
        MergeExecutionResult::MergeFailed { message } => {
            warn!(pr_number, %message, "merge call failed");
            post(host, pr_number, &report::render_merge_failed(&message)).await;
            PipelineReport::failed(format!("merge failed: {message}"))
        }
    };

    Ok(result)
}

/// Gather check inputs and aggregate them
///
/// Host failures are turned into a failed report (already commented).
async fn run_checks(
    host: &dyn HostService,
    snapshot: &PullRequestSnapshot,
    command: MergeCommand,
    permissions: &mut PermissionCache,
) -> std::result::Result<CheckReport, PipelineReport> {
    let pr_number = snapshot.number;

    let unresolved_threads = match host.count_unresolved_threads(pr_number).await {
        Ok(count) => count,
        Err(e) => {
            return Err(host_failure(host, pr_number, "count review threads", &e.to_string()).await);
        }
    };

    let approvals = match reconcile_approvals(host, snapshot, permissions).await {
        Ok(tally) => tally,
        Err(e) => {
            return Err(host_failure(host, pr_number, "list reviews", &e.to_string()).await);
        }
    };

    // Independent of the gate: posted even when the checks also fail
    if !approvals.dismissal_failures.is_empty() {
        post(
            host,
            pr_number,
            &report::render_dismissal_warning(&approvals.dismissal_failures),
        )
        .await;
    }

    Ok(aggregate_checks(&CheckInputs {
        snapshot,
        unresolved_threads,
        approvals: &approvals,
        conventional_title: is_conventional_title(&snapshot.title),
        override_approval: command.override_approval,
    }))
}
