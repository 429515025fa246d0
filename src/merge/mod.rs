//! Merge engine
//!
//! Three-phase pattern:
//! 1. Gather - snapshot, reviews, threads, commits (effectful, bounded)
//! 2. Plan - resolve method and compose the commit (pure, testable)
//! 3. Execute - guarded merge (effectful)

mod execute;
mod message;
mod method;
mod plan;

pub use execute::{ExecutionPhase, MergeExecutionResult, NotMergeableReason, execute_merge};
pub use message::{CommitMessagePlan, MessageInputs, compose_commit_message};
pub use method::{BranchPolicy, MergeMethodDecision, resolve_merge_method};
pub use plan::{MergePlan, create_merge_plan};
