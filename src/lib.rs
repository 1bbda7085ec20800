// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod git;
pub mod jobs;
pub mod logging;
pub mod publish;
pub mod schedule;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{Engine, EngineOptions};
use crate::git::repo::GitRepo;
use crate::git::runner::GitCli;
use crate::jobs::registry::JobRegistry;
use crate::publish::pipeline::Publisher;
use crate::publish::read_model::{CommandRefresh, NoopRefresh, ReadModel};
use crate::schedule::trigger::{parse_hhmm, Trigger};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - job registry / publisher / read-model refresh
/// - git state machine
/// - the engine loop (with Ctrl-C handling)
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let registry = JobRegistry::from_config(&cfg)?;
    let publisher = Publisher::new(cfg.repo.path.clone(), &cfg.publish);

    let read_model: Box<dyn ReadModel> = match cfg.publish.refresh_cmd.as_deref() {
        Some(cmd) => Box::new(CommandRefresh::new(cmd)),
        None => Box::new(NoopRefresh),
    };

    let repo = GitRepo::new(
        GitCli,
        cfg.repo.path.clone(),
        cfg.repo.remote_url.clone(),
        cfg.repo.branch.clone(),
        cfg.repo.max_commits_before_compact,
        Duration::from_secs(cfg.repo.push_timeout_secs),
    );

    let options = EngineOptions {
        once: args.once,
        force_push_on_startup: cfg.repo.force_push_on_startup,
    };

    let engine = Engine::new(
        registry,
        publisher,
        read_model,
        repo,
        force_push_trigger(&cfg)?,
        options,
    );

    engine.run().await
}

/// Daily force-push trigger from `[repo].force_push_at`; `Disabled` when
/// the schedule is unset.
fn force_push_trigger(cfg: &ConfigFile) -> Result<Trigger> {
    match cfg.repo.force_push_at.as_deref() {
        Some(at) => {
            let (hour, minute) = parse_hhmm(at)?;
            Ok(Trigger::DailyAt { hour, minute })
        }
        None => Ok(Trigger::Disabled),
    }
}

/// Simple dry-run output: print the schedule and publish settings.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    println!("gitpulse dry-run");
    println!("  repo.path = {}", cfg.repo.path.display());
    println!("  repo.branch = {}", cfg.repo.branch);
    println!(
        "  repo.max_commits_before_compact = {}",
        cfg.repo.max_commits_before_compact
    );
    println!("  repo.push_timeout_secs = {}", cfg.repo.push_timeout_secs);
    if cfg.repo.force_push_on_startup {
        println!("  repo.force_push_on_startup = true");
    }
    if let Some(ref at) = cfg.repo.force_push_at {
        println!("  force push: daily at {at}");
    }
    println!();

    println!("jobs ({}):", cfg.job.len());
    for (name, job) in cfg.job.iter() {
        let trigger = Trigger::from_spec(&job.trigger)?;
        println!("  - {name}");
        println!("      cmd: {}", job.cmd);
        println!("      trigger: {trigger}");
    }
    println!();

    println!("artifacts ({}):", cfg.publish.artifacts.len());
    for artifact in cfg.publish.artifacts.iter() {
        println!(
            "  - {} -> {}",
            artifact.source.display(),
            artifact.dest
        );
    }
    if let Some(ref cmd) = cfg.publish.refresh_cmd {
        println!("refresh_cmd: {cmd}");
    }

    Ok(())
}
