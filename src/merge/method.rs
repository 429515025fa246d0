//! Merge method resolution from branch names (PURE)

use crate::types::MergeMethod;

/// Branch naming conventions that drive the merge method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPolicy {
    /// Prefix of release branches, e.g. `release/`
    pub release_prefix: String,
    /// Prefix of back-merge branches, e.g. `sync/`
    pub sync_prefix: String,
    /// Name of the integration branch, e.g. `develop`
    pub develop_branch: String,
}

impl Default for BranchPolicy {
    fn default() -> Self {
        Self {
            release_prefix: "release/".to_string(),
            sync_prefix: "sync/".to_string(),
            develop_branch: "develop".to_string(),
        }
    }
}

/// Chosen merge method and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMethodDecision {
    /// Merge strategy
    pub method: MergeMethod,
    /// Human-readable justification
    pub reason: String,
}

/// Pick the merge method for a PR
///
/// First match wins, head rules before base rules:
/// 1. head is a release branch -> merge
/// 2. head is a sync branch -> merge
/// 3. base is a release branch -> squash
/// 4. base is the develop branch (exact) -> squash
/// 5. otherwise -> merge
pub fn resolve_merge_method(
    head_ref: &str,
    base_ref: &str,
    policy: &BranchPolicy,
) -> MergeMethodDecision {
    let (method, reason) = if head_ref.starts_with(&policy.release_prefix) {
        (
            MergeMethod::Merge,
            format!("`{head_ref}` is a release branch; merge commit used to preserve release history"),
        )
    } else if head_ref.starts_with(&policy.sync_prefix) {
        (
            MergeMethod::Merge,
            format!("`{head_ref}` is a sync branch; merge commit used to preserve back-merge history"),
        )
    } else if base_ref.starts_with(&policy.release_prefix) {
        (
            MergeMethod::Squash,
            format!("targets release branch `{base_ref}`; squashed to keep the release linear"),
        )
    } else if base_ref == policy.develop_branch {
        (
            MergeMethod::Squash,
            format!("targets `{base_ref}`; feature work is squashed into a single commit"),
        )
    } else {
        (
            MergeMethod::Merge,
            "default strategy: merge commit".to_string(),
        )
    };

    MergeMethodDecision { method, reason }
}
