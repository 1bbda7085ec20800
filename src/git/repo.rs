// src/git/repo.rs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::git::runner::{CommandOutput, CommandRunner};

/// Result of one ordinary commit-and-push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Working tree was clean (or there was nothing to commit); no push.
    NoChanges,
    /// Committed and pushed normally.
    Pushed { commit_count: u32 },
    /// Commit count hit the threshold; history was squashed and force-pushed
    /// instead of an ordinary push.
    Compacted,
}

/// Owns the repository lifecycle: initialization, branch assurance,
/// commits, pushes and history compaction.
///
/// Nothing about the repository is cached across ticks; dirtiness and
/// commit count are re-derived from the subprocess every time, so a failed
/// cycle is naturally retried by the next tick.
pub struct GitRepo<R> {
    runner: R,
    path: PathBuf,
    remote_url: String,
    branch: String,
    max_commits: u32,
    push_timeout: Duration,
}

impl<R: CommandRunner> GitRepo<R> {
    pub fn new(
        runner: R,
        path: PathBuf,
        remote_url: String,
        branch: String,
        max_commits: u32,
        push_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            path,
            remote_url,
            branch,
            max_commits,
            push_timeout,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Run one git command in the repository, logging failures.
    async fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let out = self.runner.run(args, &self.path).await?;
        if out.success {
            debug!(?args, "git command succeeded");
        } else {
            error!(?args, stderr = %out.stderr, "git command failed");
        }
        Ok(out)
    }

    /// Bring the repository to `READY`: init + remote + branch on first run,
    /// branch assurance afterwards.
    ///
    /// A missing target directory is fatal; the loop cannot proceed without
    /// a working tree to publish into.
    pub async fn ensure_initialized(&self) -> Result<()> {
        if !self.path.exists() {
            bail!(
                "repository directory {} does not exist",
                self.path.display()
            );
        }

        if !self.path.join(".git").exists() {
            info!(path = %self.path.display(), "initializing git repository");

            if !self.git(&["init"]).await?.success {
                bail!("git init failed");
            }
            if !self
                .git(&["remote", "add", "origin", &self.remote_url])
                .await?
                .success
            {
                bail!("git remote add failed");
            }
            if !self.git(&["checkout", "-b", &self.branch]).await?.success {
                bail!("git checkout -b {} failed", self.branch);
            }

            info!("git repository initialized");
            return Ok(());
        }

        debug!("git repository already exists");

        // Ensure the expected branch is checked out, creating it if missing.
        if !self.git(&["checkout", &self.branch]).await?.success
            && !self.git(&["checkout", "-b", &self.branch]).await?.success
        {
            warn!(branch = %self.branch, "could not check out publish branch");
        }

        Ok(())
    }

    /// Whether the working tree has uncommitted changes.
    pub async fn is_dirty(&self) -> Result<bool> {
        let out = self.git(&["status", "--porcelain"]).await?;
        if !out.success {
            bail!("git status failed");
        }
        Ok(!out.stdout.trim().is_empty())
    }

    async fn stage_all(&self) -> Result<()> {
        if !self.git(&["add", "."]).await?.success {
            bail!("git add failed");
        }
        Ok(())
    }

    /// Commit staged changes. Returns `false` when git refused the commit,
    /// which in practice means there was nothing to commit.
    async fn commit(&self, message: &str) -> Result<bool> {
        let out = self.git(&["commit", "-m", message]).await?;
        if !out.success {
            debug!("nothing to commit (possibly no changes)");
        }
        Ok(out.success)
    }

    /// Current number of commits on HEAD; 0 when unavailable.
    pub async fn commit_count(&self) -> u32 {
        match self.git(&["rev-list", "--count", "HEAD"]).await {
            Ok(out) if out.success => out.stdout.trim().parse().unwrap_or_else(|_| {
                error!(output = %out.stdout, "invalid commit count output");
                0
            }),
            _ => 0,
        }
    }

    async fn push(&self, force: bool) -> Result<()> {
        let mut args = vec!["push"];
        if force {
            warn!("force pushing; this overwrites remote history");
            args.push("-f");
        }
        args.push(&self.remote_url);
        args.push(&self.branch);

        let out = self.git(&args).await?;
        if !out.success {
            bail!("git push failed: {}", out.stderr);
        }
        Ok(())
    }

    /// Ordinary publish path: stage, commit, then either push or compact.
    ///
    /// The whole sequence is bounded by the configured push timeout; on
    /// expiry the step fails for this cycle without killing any subprocess
    /// (a hung process past the window is left to finish on its own).
    ///
    /// Force cycles never consult the compaction threshold.
    pub async fn commit_and_push(&self, message: &str, force: bool) -> Result<PushOutcome> {
        tokio::time::timeout(self.push_timeout, self.commit_and_push_inner(message, force))
            .await
            .map_err(|_| {
                anyhow!(
                    "git operations timed out after {}s",
                    self.push_timeout.as_secs()
                )
            })?
    }

    async fn commit_and_push_inner(&self, message: &str, force: bool) -> Result<PushOutcome> {
        if !self.is_dirty().await? {
            debug!("no changes to commit");
            return Ok(PushOutcome::NoChanges);
        }

        self.stage_all().await?;

        if !self.commit(message).await? {
            return Ok(PushOutcome::NoChanges);
        }

        let commit_count = self.commit_count().await;
        if !force && commit_count >= self.max_commits {
            info!(commit_count, "commit threshold reached; compacting history");
            self.compact_history().await?;
            return Ok(PushOutcome::Compacted);
        }

        self.push(force).await?;
        info!(commit_count, force, "changes committed and pushed");
        Ok(PushOutcome::Pushed { commit_count })
    }

    /// Replace full history with a single squashed commit.
    ///
    /// Creates a parentless branch, commits the current tree once, deletes
    /// the old default branch, renames and force-pushes. On any step failure
    /// the compaction is abandoned for this cycle; a stray temp branch may
    /// remain and is left for the operator, not corrected automatically.
    pub async fn compact_history(&self) -> Result<()> {
        info!("starting commit history compaction");

        let temp_branch = format!("compact-{}", chrono::Local::now().timestamp());

        if !self
            .git(&["checkout", "--orphan", &temp_branch])
            .await?
            .success
        {
            bail!("creating orphan branch {temp_branch} failed");
        }

        self.stage_all().await?;

        if !self.commit("history compaction").await? {
            bail!("compaction commit failed");
        }

        // Deleting the old branch can fail if it never existed locally.
        if !self.git(&["branch", "-D", &self.branch]).await?.success {
            warn!(branch = %self.branch, "could not delete old branch");
        }

        if !self.git(&["branch", "-m", &self.branch]).await?.success {
            bail!("renaming {temp_branch} to {} failed", self.branch);
        }

        self.push(true).await?;
        info!("commit history compaction completed");
        Ok(())
    }

    /// Force-push cycle: stage everything, commit when dirty, push with
    /// `-f`. Used at startup and by the daily force-push schedule; it
    /// replaces the ordinary publish path for that tick.
    pub async fn force_push_cycle(&self, now: NaiveDateTime) -> Result<()> {
        warn!("starting force push");

        self.stage_all().await?;

        if self.is_dirty().await? {
            let message = format!("[{}] force push update", now.format("%Y-%m-%d %H:%M:%S"));
            self.commit(&message).await?;
        }

        self.push(true).await?;
        info!("repository force pushed");
        Ok(())
    }
}
