// src/publish/read_model.rs

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::jobs::producer::shell_command;

/// Read-model refresh contract.
///
/// The refresh renders the human-facing document and auxiliary files into
/// the working tree at fixed, pre-agreed paths. Returns `true` when fully
/// successful; `false` means a partial failure. Either way the publish
/// attempt proceeds, so the working tree is always re-checked for changes.
#[async_trait]
pub trait ReadModel: Send + Sync {
    async fn refresh(&self) -> bool;
}

/// Refresh backed by an external render command (`[publish].refresh_cmd`).
pub struct CommandRefresh {
    cmd: String,
}

impl CommandRefresh {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

#[async_trait]
impl ReadModel for CommandRefresh {
    async fn refresh(&self) -> bool {
        debug!(cmd = %self.cmd, "running read-model refresh");

        match shell_command(&self.cmd).output().await {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                warn!(
                    exit_code = output.status.code().unwrap_or(-1),
                    "read-model refresh exited with failure"
                );
                false
            }
            Err(err) => {
                warn!(error = %err, "failed to spawn read-model refresh");
                false
            }
        }
    }
}

/// No-op refresh, used when no refresh command is configured.
pub struct NoopRefresh;

#[async_trait]
impl ReadModel for NoopRefresh {
    async fn refresh(&self) -> bool {
        true
    }
}
