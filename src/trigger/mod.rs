//! Trigger event intake
//!
//! Reads the `issue_comment` webhook payload that started this run and
//! recognizes the merge command inside it.

mod command;

pub use command::{CommandFlag, CommandParse, MergeCommand, command_usage, parse_command};

use crate::error::{Error, Result};
use crate::types::AuthorAssociation;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Account type of the commenting user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ActorKind {
    /// A human account
    User,
    /// A GitHub App or other automation
    Bot,
    /// An organization
    Organization,
    /// Anything else
    Other(String),
}

impl From<String> for ActorKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "User" => Self::User,
            "Bot" => Self::Bot,
            "Organization" => Self::Organization,
            _ => Self::Other(value),
        }
    }
}

/// User who posted the triggering comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Login
    pub login: String,
    /// Account type
    pub kind: ActorKind,
}

impl Actor {
    /// Automated accounts never trigger merges
    pub fn is_bot(&self) -> bool {
        self.kind == ActorKind::Bot || self.login.ends_with("[bot]")
    }
}

/// Everything the pipeline needs from the trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Triggering comment ID
    pub comment_id: u64,
    /// Raw comment text
    pub body: String,
    /// Comment author
    pub actor: Actor,
    /// Comment author's association with the repository
    pub author_association: AuthorAssociation,
    /// Issue / PR number
    pub pr_number: u64,
    /// The comment is on a pull request, not a plain issue
    pub is_pull_request: bool,
}

#[derive(Deserialize)]
struct RawEvent {
    comment: RawComment,
    issue: RawIssue,
}

#[derive(Deserialize)]
struct RawComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    user: RawUser,
    author_association: AuthorAssociation,
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
    #[serde(rename = "type")]
    kind: ActorKind,
}

#[derive(Deserialize)]
struct RawIssue {
    number: u64,
    pull_request: Option<serde_json::Value>,
}

impl TriggerEvent {
    /// Parse an `issue_comment` payload
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawEvent = serde_json::from_str(json)
            .map_err(|e| Error::Event(format!("not an issue_comment payload: {e}")))?;

        Ok(Self {
            comment_id: raw.comment.id,
            body: raw.comment.body.unwrap_or_default(),
            actor: Actor {
                login: raw.comment.user.login,
                kind: raw.comment.user.kind,
            },
            author_association: raw.comment.author_association,
            pr_number: raw.issue.number,
            is_pull_request: raw.issue.pull_request.is_some(),
        })
    }

    /// Read and parse the payload at `path` (usually `$GITHUB_EVENT_PATH`)
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Event(format!("failed to read event file {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }
}
