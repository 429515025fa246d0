//! Commit message composition (PURE)
//!
//! Both layouts are relied upon by downstream tooling, so block order and
//! filtering are fixed.

use crate::types::{CommitInfo, MergeMethod};

/// Title and body for the merge commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessagePlan {
    /// Commit title
    pub title: String,
    /// Commit body
    pub body: String,
}

/// Inputs for [`compose_commit_message`]
#[derive(Debug, Clone, Copy)]
pub struct MessageInputs<'a> {
    /// PR number
    pub pr_number: u64,
    /// PR title
    pub pr_title: &'a str,
    /// Head branch name
    pub head_ref: &'a str,
    /// Login of the user who issued the command
    pub actor: &'a str,
    /// The approval requirement was actually overridden
    pub approval_overridden: bool,
    /// PR commits, oldest first (only read for squash)
    pub commits: &'a [CommitInfo],
}

/// Build the commit title and body for `method`
pub fn compose_commit_message(method: MergeMethod, inputs: &MessageInputs<'_>) -> CommitMessagePlan {
    let metadata = metadata_block(inputs);
    match method {
        MergeMethod::Merge => CommitMessagePlan {
            title: format!(
                "Merge pull request #{} from {}",
                inputs.pr_number, inputs.head_ref
            ),
            body: format!("{}\n\n{metadata}", inputs.pr_title),
        },
        MergeMethod::Squash => {
            let bullets = commit_bullets(inputs.commits);
            let co_authors = co_author_lines(inputs.commits);
            let blocks: Vec<String> = [bullets, co_authors, metadata]
                .into_iter()
                .filter(|block| !block.is_empty())
                .collect();
            CommitMessagePlan {
                title: format!("{} (#{})", inputs.pr_title, inputs.pr_number),
                body: blocks.join("\n\n"),
            }
        }
    }
}

fn metadata_block(inputs: &MessageInputs<'_>) -> String {
    let mut lines = vec![format!("Merged-by: @{}", inputs.actor)];
    if inputs.approval_overridden {
        lines.push(format!(
            "Approval-override: merged without a valid approval at the request of @{}",
            inputs.actor
        ));
    }
    lines.join("\n")
}

/// `* <subject>` per commit, oldest first, skipping empty subjects
fn commit_bullets(commits: &[CommitInfo]) -> String {
    commits
        .iter()
        .map(CommitInfo::subject)
        .filter(|subject| !subject.is_empty())
        .map(|subject| format!("* {subject}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One trailer per distinct author, in first-appearance order
fn co_author_lines(commits: &[CommitInfo]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for commit in commits {
        let (Some(name), Some(email)) = (&commit.author_name, &commit.author_email) else {
            continue;
        };
        let line = format!("Co-authored-by: {name} <{email}>");
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines.join("\n")
}
