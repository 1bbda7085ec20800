// src/config/validate.rs

use anyhow::{anyhow, Context, Result};

use crate::config::model::ConfigFile;
use crate::schedule::trigger::{parse_hhmm, Trigger};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one job
/// - every job trigger parses (interval >= 1, valid `HH:MM` times)
/// - `force_push_at`, when present, parses as `HH:MM`
/// - `max_commits_before_compact >= 2` and `push_timeout_secs >= 1`
/// - repo path, remote URL and artifact destinations are non-empty
///
/// It does **not** check that the repository path exists; that is a startup
/// concern of the engine (and a fatal one there).
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_repo(cfg)?;
    validate_jobs(cfg)?;
    validate_artifacts(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &ConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(anyhow!(
            "config must contain at least one [job.<name>] section"
        ));
    }
    Ok(())
}

fn validate_repo(cfg: &ConfigFile) -> Result<()> {
    if cfg.repo.path.as_os_str().is_empty() {
        return Err(anyhow!("[repo].path must not be empty"));
    }
    if cfg.repo.remote_url.trim().is_empty() {
        return Err(anyhow!("[repo].remote_url must not be empty"));
    }
    if cfg.repo.branch.trim().is_empty() {
        return Err(anyhow!("[repo].branch must not be empty"));
    }
    if cfg.repo.max_commits_before_compact < 2 {
        return Err(anyhow!(
            "[repo].max_commits_before_compact must be >= 2 (got {})",
            cfg.repo.max_commits_before_compact
        ));
    }
    if cfg.repo.push_timeout_secs == 0 {
        return Err(anyhow!("[repo].push_timeout_secs must be >= 1 (got 0)"));
    }

    if let Some(ref at) = cfg.repo.force_push_at {
        parse_hhmm(at).context("invalid [repo].force_push_at")?;
    }

    Ok(())
}

fn validate_jobs(cfg: &ConfigFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        if job.cmd.trim().is_empty() {
            return Err(anyhow!("job '{}' has an empty `cmd`", name));
        }
        Trigger::from_spec(&job.trigger)
            .with_context(|| format!("invalid trigger for job '{}'", name))?;
    }
    Ok(())
}

fn validate_artifacts(cfg: &ConfigFile) -> Result<()> {
    for artifact in cfg.publish.artifacts.iter() {
        if artifact.source.as_os_str().is_empty() {
            return Err(anyhow!("[publish].artifacts entry has an empty `source`"));
        }
        if artifact.dest.trim().is_empty() {
            return Err(anyhow!(
                "[publish].artifacts entry for {:?} has an empty `dest`",
                artifact.source
            ));
        }
    }
    Ok(())
}
