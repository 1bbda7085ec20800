// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [repo]
/// path = "/srv/publish/tree"
/// remote_url = "https://github.com/me/memo"
///
/// [publish]
/// artifacts = [{ source = "out/README.md", dest = "README.md" }]
///
/// [job.time]
/// cmd = "gen time"
/// trigger = "every_tick"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Repository and push behaviour from `[repo]`.
    pub repo: RepoSection,

    /// Working-tree publication settings from `[publish]`.
    #[serde(default)]
    pub publish: PublishSection,

    /// All jobs from `[job.<name>]`.
    ///
    /// Keys are the *job names* (e.g. `"time"`, `"weather"`, `"geo"`).
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[repo]` section.
///
/// Describes the target repository and the push/compaction policy.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSection {
    /// Path to the working tree. Must already exist; gitpulse never creates it.
    pub path: PathBuf,

    /// Remote URL pushed to on every publish.
    pub remote_url: String,

    /// Branch to publish on.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// When the commit count reaches this threshold, history is squashed
    /// into a single commit and force-pushed.
    #[serde(default = "default_max_commits")]
    pub max_commits_before_compact: u32,

    /// Wall-clock bound on one commit-and-push attempt, in seconds.
    #[serde(default = "default_push_timeout_secs")]
    pub push_timeout_secs: u64,

    /// Force-push the current tree once at startup, before the loop begins.
    #[serde(default)]
    pub force_push_on_startup: bool,

    /// Optional daily force-push time as `"HH:MM"`; absent = disabled.
    #[serde(default)]
    pub force_push_at: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_max_commits() -> u32 {
    720
}

fn default_push_timeout_secs() -> u64 {
    10
}

/// `[publish]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PublishSection {
    /// File whose content becomes the commit message. When absent or
    /// unreadable, a generic message is used instead.
    #[serde(default)]
    pub commit_message_file: Option<PathBuf>,

    /// Fixed list of files copied into the working tree each cycle.
    /// Each copy is best-effort; a missing source is skipped.
    #[serde(default)]
    pub artifacts: Vec<ArtifactSpec>,

    /// Optional command that renders the human-facing document into the
    /// working tree after each batch (the read-model refresh).
    #[serde(default)]
    pub refresh_cmd: Option<String>,
}

/// One (source path, destination filename) pair from `[publish].artifacts`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactSpec {
    /// Where the producer writes the file.
    pub source: PathBuf,

    /// Filename inside the working tree.
    pub dest: String,
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// The generator command to execute when the job fires.
    pub cmd: String,

    /// When the job fires. See [`TriggerSpec`].
    pub trigger: TriggerSpec,
}

/// Trigger as written in TOML. Accepted forms:
///
/// ```toml
/// trigger = "every_tick"
/// trigger = "hourly"
/// trigger = { every_minutes = 15 }
/// trigger = { daily_at = "10:00" }
/// ```
///
/// Conversion into the evaluated [`crate::schedule::Trigger`] happens in
/// `schedule::trigger`, with validation in `config::validate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TriggerSpec {
    /// `"every_tick"` or `"hourly"`.
    Named(String),
    /// `{ every_minutes = N }`.
    EveryMinutes { every_minutes: u32 },
    /// `{ daily_at = "HH:MM" }`.
    DailyAt { daily_at: String },
}
