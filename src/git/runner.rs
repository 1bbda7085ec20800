// src/git/runner.rs

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one subprocess invocation.
///
/// `success` is exit code 0. `stderr` is diagnostic only and is never
/// parsed for control flow.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Narrow seam over the version-control binary.
///
/// The state machine only ever needs "run these arguments in this working
/// directory and give me (success, stdout, stderr)", which keeps the whole
/// git layer mockable in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput>;
}

/// Production runner invoking the `git` binary.
pub struct GitCli;

#[async_trait]
impl CommandRunner for GitCli {
    async fn run(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        debug!(?args, cwd = %cwd.display(), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .with_context(|| format!("spawning `git {}`", args.join(" ")))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
