//! Shared test fixtures

#![allow(dead_code)]

pub mod mock_platform;

pub use mock_platform::MockHostService;

use merge_gate::trigger::{Actor, ActorKind, TriggerEvent};
use merge_gate::types::{
    AuthorAssociation, CommitInfo, Mergeability, MergeableState, PermissionLevel, PrState,
    PullRequestSnapshot, Review,
};

/// Head SHA used by [`make_snapshot`]
pub const HEAD_SHA: &str = "1111111aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// A different SHA, for stale approvals and moved heads
pub const OLD_SHA: &str = "2222222bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Login of the PR author in fixtures
pub const AUTHOR: &str = "alice";

/// Login of the commenting maintainer in fixtures
pub const MAINTAINER: &str = "carol";

/// Open, clean, mergeable PR from `feature/login` into `develop`
pub fn make_snapshot(number: u64) -> PullRequestSnapshot {
    PullRequestSnapshot {
        number,
        state: PrState::Open,
        locked: false,
        draft: false,
        merged: false,
        mergeable: Mergeability::Mergeable,
        mergeable_state: MergeableState::Clean,
        head_sha: HEAD_SHA.to_string(),
        head_ref: "feature/login".to_string(),
        base_ref: "develop".to_string(),
        author: AUTHOR.to_string(),
        is_fork: false,
        title: "feat(auth): add login page".to_string(),
    }
}

/// Same PR with a different mergeability
pub fn with_mergeable(
    mut snapshot: PullRequestSnapshot,
    mergeable: Mergeability,
    state: MergeableState,
) -> PullRequestSnapshot {
    snapshot.mergeable = mergeable;
    snapshot.mergeable_state = state;
    snapshot
}

/// `/merge` comment on PR `number` by the maintainer
pub fn make_event(number: u64, body: &str) -> TriggerEvent {
    TriggerEvent {
        comment_id: 9001,
        body: body.to_string(),
        actor: Actor {
            login: MAINTAINER.to_string(),
            kind: ActorKind::User,
        },
        author_association: AuthorAssociation::Member,
        pr_number: number,
        is_pull_request: true,
    }
}

pub fn approval(id: u64, reviewer: &str, commit: &str) -> Review {
    Review {
        id,
        reviewer: Some(reviewer.to_string()),
        commit_id: Some(commit.to_string()),
    }
}

pub fn commit(sha: &str, message: &str, author: &str) -> CommitInfo {
    CommitInfo {
        sha: sha.to_string(),
        message: message.to_string(),
        author_name: Some(author.to_string()),
        author_email: Some(format!("{}@example.com", author.to_lowercase())),
    }
}

/// Mock with a mergeable PR, a write-access maintainer and one fresh approval
pub fn ready_host(number: u64) -> MockHostService {
    let host = MockHostService::new(make_snapshot(number));
    host.set_permission(MAINTAINER, PermissionLevel::Write);
    host.set_permission("bob", PermissionLevel::Write);
    host.set_reviews(vec![approval(1, "bob", HEAD_SHA)]);
    host
}
