//! merge-gate: command-triggered, concurrency-safe pull request merging
//!
//! A trusted user comments `/merge` on a pull request; merge-gate checks
//! authorization, readiness, conversations, approvals, mergeability and
//! title format, then merges with a strategy chosen from branch names,
//! guarding the merge against commits pushed while it was deciding.
//!
//! The library is organized as:
//! - [`trigger`] - event intake and command parsing
//! - [`checks`] - check primitives, approval reconciliation, aggregation
//! - [`merge`] - method resolution, commit message, plan and execution
//! - [`pipeline`] - orchestration into a single outcome
//! - [`platform`] - the host abstraction and its GitHub implementation

pub mod auth;
pub mod checks;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod report;
pub mod trigger;
pub mod types;
