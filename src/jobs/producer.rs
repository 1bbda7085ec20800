// src/jobs/producer.rs

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

/// Result of one producer run.
///
/// Producers degrade instead of failing: on any internal error they return
/// [`Artifact::Fallback`] with a reason, so a run can never abort the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// The producer ran and persisted fresh output.
    Fresh(String),
    /// The producer hit an internal failure and fell back to a default.
    Fallback { reason: String },
}

/// The contract every content generator fulfils.
///
/// `run` must not fail; persisting the generated output is the producer's
/// own responsibility and invisible to the scheduling core. A panic here is
/// a contract violation and is surfaced as a batch failure by the
/// dispatcher.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn run(&self) -> Artifact;
}

/// A producer backed by an external generator command.
///
/// The command is run through the platform shell with output captured.
/// Every failure mode (spawn error, non-zero exit, undecodable output) is
/// absorbed into an [`Artifact::Fallback`].
pub struct CommandProducer {
    name: String,
    cmd: String,
}

impl CommandProducer {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
        }
    }
}

#[async_trait]
impl Producer for CommandProducer {
    async fn run(&self) -> Artifact {
        debug!(job = %self.name, cmd = %self.cmd, "starting generator command");

        let output = match shell_command(&self.cmd).output().await {
            Ok(output) => output,
            Err(err) => {
                warn!(job = %self.name, error = %err, "failed to spawn generator");
                return Artifact::Fallback {
                    reason: format!("spawn failed: {err}"),
                };
            }
        };

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                job = %self.name,
                exit_code = code,
                stderr = %stderr.trim(),
                "generator exited with failure"
            );
            return Artifact::Fallback {
                reason: format!("exit code {code}"),
            };
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(job = %self.name, "generator completed");
        Artifact::Fresh(stdout)
    }
}

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}
