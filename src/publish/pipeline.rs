// src/publish/pipeline.rs

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::config::model::{ArtifactSpec, PublishSection};

/// Fallback commit message when the message file is absent or unreadable.
const DEFAULT_COMMIT_MESSAGE: &str = "automated update";

/// Copies generated artifacts into the working tree and builds commit
/// messages.
///
/// The artifact list is fixed at startup. Copying is best-effort per file:
/// a missing source is logged and skipped, never fatal to the cycle.
pub struct Publisher {
    repo_dir: PathBuf,
    artifacts: Vec<ArtifactSpec>,
    commit_message_file: Option<PathBuf>,
}

impl Publisher {
    pub fn new(repo_dir: PathBuf, publish: &PublishSection) -> Self {
        Self {
            repo_dir,
            artifacts: publish.artifacts.clone(),
            commit_message_file: publish.commit_message_file.clone(),
        }
    }

    /// Whether any artifacts are configured at all. When none are, a copy
    /// count of zero is not a failure.
    pub fn expects_artifacts(&self) -> bool {
        !self.artifacts.is_empty()
    }

    /// Copy each artifact's current content into the working tree.
    ///
    /// Returns the number of files copied.
    pub fn copy_into_tree(&self) -> usize {
        let mut copied = Vec::new();

        for artifact in &self.artifacts {
            if !artifact.source.exists() {
                warn!(source = %artifact.source.display(), "artifact source not found; skipping");
                continue;
            }

            let dest = self.repo_dir.join(&artifact.dest);
            match fs::copy(&artifact.source, &dest) {
                Ok(_) => {
                    debug!(
                        source = %artifact.source.display(),
                        dest = %dest.display(),
                        "copied artifact"
                    );
                    copied.push(artifact.dest.as_str());
                }
                Err(err) => {
                    warn!(
                        source = %artifact.source.display(),
                        error = %err,
                        "failed to copy artifact; skipping"
                    );
                }
            }
        }

        if copied.is_empty() {
            if self.expects_artifacts() {
                warn!("no artifact files found to copy; check [publish].artifacts paths");
            }
        } else {
            info!(files = ?copied, "copied artifacts into working tree");
        }

        copied.len()
    }

    /// Commit message for this cycle: the producer-written message file,
    /// or a generic fallback, prefixed with the tick timestamp.
    pub fn commit_message(&self, now: NaiveDateTime) -> String {
        let body = self
            .commit_message_file
            .as_ref()
            .and_then(|path| match fs::read_to_string(path) {
                Ok(contents) if !contents.trim().is_empty() => Some(contents.trim().to_string()),
                Ok(_) => None,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "could not read commit message file"
                    );
                    None
                }
            })
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());

        format!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S"), body)
    }
}
