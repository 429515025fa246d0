//! Core types for merge-gate

use serde::{Deserialize, Serialize};

/// Repository coordinates for the host service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// REST API base URL (no trailing slash)
    pub api_url: String,
}

impl PlatformConfig {
    /// Parse `owner/repo` as found in `GITHUB_REPOSITORY`
    pub fn from_slug(slug: &str, api_url: impl Into<String>) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// PR state (open or closed; merged is tracked separately)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR is closed (possibly merged)
    Closed,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Whether the host considers the PR mergeable
///
/// GitHub reports `mergeable` as `true`, `false` or `null` while it is
/// still computing the test merge in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mergeability {
    /// Test merge succeeded
    Mergeable,
    /// Test merge failed (conflicts)
    Conflicting,
    /// Host has not finished computing mergeability
    Pending,
}

impl From<Option<bool>> for Mergeability {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Mergeable,
            Some(false) => Self::Conflicting,
            None => Self::Pending,
        }
    }
}

impl Mergeability {
    /// Host is still computing
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Reason code reported alongside `mergeable`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MergeableState {
    /// Merge conflicts
    Dirty,
    /// Blocked by branch protection
    Blocked,
    /// Non-required status checks failing
    Unstable,
    /// Head branch is out of date with base
    Behind,
    /// Still being computed
    Unknown,
    /// Mergeable, pre-receive hooks present
    HasHooks,
    /// Ready to merge
    Clean,
    /// PR is a draft
    Draft,
    /// A code this crate does not know about
    Other(String),
}

impl MergeableState {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dirty => "dirty",
            Self::Blocked => "blocked",
            Self::Unstable => "unstable",
            Self::Behind => "behind",
            Self::Unknown => "unknown",
            Self::HasHooks => "has_hooks",
            Self::Clean => "clean",
            Self::Draft => "draft",
            Self::Other(code) => code,
        }
    }

    /// Whether this is the only state that allows merging
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

impl From<&str> for MergeableState {
    fn from(code: &str) -> Self {
        match code {
            "dirty" => Self::Dirty,
            "blocked" => Self::Blocked,
            "unstable" => Self::Unstable,
            "behind" => Self::Behind,
            "unknown" => Self::Unknown,
            "has_hooks" => Self::HasHooks,
            "clean" => Self::Clean,
            "draft" => Self::Draft,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for MergeableState {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl From<MergeableState> for String {
    fn from(state: MergeableState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a pull request
///
/// Never mutated after fetch: re-validation always fetches a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PullRequestSnapshot {
    /// PR number
    pub number: u64,
    /// Open or closed
    pub state: PrState,
    /// Conversation locked
    pub locked: bool,
    /// Draft PR
    pub draft: bool,
    /// Already merged
    pub merged: bool,
    /// Tri-state mergeability
    pub mergeable: Mergeability,
    /// Reason code for `mergeable`
    pub mergeable_state: MergeableState,
    /// Head commit SHA
    pub head_sha: String,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Login of the PR author
    pub author: String,
    /// Head lives in a different repository
    pub is_fork: bool,
    /// PR title
    pub title: String,
}

impl PullRequestSnapshot {
    /// Abbreviated head SHA for messages
    pub fn short_sha(&self) -> &str {
        short_sha(&self.head_sha)
    }
}

/// First seven characters of a commit SHA
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// `author_association` as reported on comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum AuthorAssociation {
    /// Repository owner
    Owner,
    /// Organization member
    Member,
    /// Invited collaborator
    Collaborator,
    /// Has previously contributed
    Contributor,
    /// First contribution to this repository
    FirstTimeContributor,
    /// First contribution to GitHub
    FirstTimer,
    /// Placeholder for an unclaimed user
    Mannequin,
    /// No association
    None,
    /// Anything else
    Other(String),
}

impl From<String> for AuthorAssociation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OWNER" => Self::Owner,
            "MEMBER" => Self::Member,
            "COLLABORATOR" => Self::Collaborator,
            "CONTRIBUTOR" => Self::Contributor,
            "FIRST_TIME_CONTRIBUTOR" => Self::FirstTimeContributor,
            "FIRST_TIMER" => Self::FirstTimer,
            "MANNEQUIN" => Self::Mannequin,
            "NONE" => Self::None,
            _ => Self::Other(value),
        }
    }
}

impl std::fmt::Display for AuthorAssociation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Owner => "OWNER",
            Self::Member => "MEMBER",
            Self::Collaborator => "COLLABORATOR",
            Self::Contributor => "CONTRIBUTOR",
            Self::FirstTimeContributor => "FIRST_TIME_CONTRIBUTOR",
            Self::FirstTimer => "FIRST_TIMER",
            Self::Mannequin => "MANNEQUIN",
            Self::None => "NONE",
            Self::Other(other) => other,
        };
        f.write_str(s)
    }
}

/// Repository permission of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionLevel {
    /// Full control
    Admin,
    /// Manage without destructive admin actions
    Maintain,
    /// Push access
    Write,
    /// Manage issues and PRs without push
    Triage,
    /// Read-only
    Read,
    /// No access, or lookup failed
    None,
}

impl PermissionLevel {
    /// Parse GitHub's `permission` / `role_name` string
    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "maintain" => Self::Maintain,
            "write" => Self::Write,
            "triage" => Self::Triage,
            "read" => Self::Read,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Maintain => "maintain",
            Self::Write => "write",
            Self::Triage => "triage",
            Self::Read => "read",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// An `APPROVED` review as listed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Review ID (for dismissal)
    pub id: u64,
    /// Reviewer login (`None` for deleted accounts)
    pub reviewer: Option<String>,
    /// Commit the review was submitted against
    pub commit_id: Option<String>,
}

/// A commit belonging to a PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit SHA
    pub sha: String,
    /// Full commit message
    pub message: String,
    /// Git author name
    pub author_name: Option<String>,
    /// Git author email
    pub author_email: Option<String>,
}

impl CommitInfo {
    /// First line of the message, trimmed
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }
}

/// Merge strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    Merge,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Parameters for the final merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// PR number
    pub pr_number: u64,
    /// Merge strategy
    pub method: MergeMethod,
    /// Head SHA that must still be current for the host to accept the merge
    pub expected_head_sha: String,
    /// Commit title
    pub commit_title: String,
    /// Commit body
    pub commit_message: String,
}

/// Result of a merge operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Reaction added to the triggering comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// 👀
    Eyes,
    /// 🚀
    Rocket,
    /// 😕
    Confused,
}

impl Reaction {
    /// GitHub reaction `content` value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eyes => "eyes",
            Self::Rocket => "rocket",
            Self::Confused => "confused",
        }
    }
}
