// src/git/mod.rs

//! Git-backed publish state machine.
//!
//! Responsibilities:
//! - Narrow subprocess seam over the `git` binary so the state machine can
//!   be tested against a mock without a repository or network (`runner.rs`).
//! - Repository lifecycle: initialization, branch assurance, commit,
//!   commit-count-based history compaction, ordinary push and force-push
//!   (`repo.rs`).
//!
//! Repository state is always re-derived from the subprocess each cycle,
//! never cached across ticks.

pub mod repo;
pub mod runner;

pub use repo::{GitRepo, PushOutcome};
pub use runner::{CommandOutput, CommandRunner, GitCli};
