// src/engine/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::git::repo::{GitRepo, PushOutcome};
use crate::git::runner::CommandRunner;
use crate::jobs::producer::Producer;
use crate::jobs::registry::{dispatch, JobRegistry};
use crate::publish::pipeline::Publisher;
use crate::publish::read_model::ReadModel;
use crate::schedule::clock;
use crate::schedule::state::ScheduleState;
use crate::schedule::trigger::Trigger;

/// Backoff after a batch failure before the next tick is attempted.
const CYCLE_FAILURE_BACKOFF: Duration = Duration::from_secs(5);

/// Options that influence how the engine behaves.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// If true, run exactly one full cycle after startup and exit.
    pub once: bool,

    /// Force-push the current tree once during startup.
    pub force_push_on_startup: bool,
}

/// The main orchestration loop.
///
/// One logical task owns the whole cycle: align to the minute, evaluate
/// triggers, dispatch the ready batch, refresh the read model, copy
/// artifacts, then either force-push or commit-and-push. Cycle N+1 never
/// starts before cycle N's publish step has returned, so the working tree
/// and repository are touched by at most one invocation at a time.
pub struct Engine<R> {
    registry: JobRegistry,
    state: ScheduleState,
    publisher: Publisher,
    read_model: Box<dyn ReadModel>,
    repo: GitRepo<R>,
    force_push_trigger: Trigger,
    options: EngineOptions,
}

impl<R: CommandRunner> Engine<R> {
    pub fn new(
        registry: JobRegistry,
        publisher: Publisher,
        read_model: Box<dyn ReadModel>,
        repo: GitRepo<R>,
        force_push_trigger: Trigger,
        options: EngineOptions,
    ) -> Self {
        Self {
            registry,
            state: ScheduleState::new(),
            publisher,
            read_model,
            repo,
            force_push_trigger,
            options,
        }
    }

    /// Startup, then the infinite tick loop (or a single cycle in once
    /// mode). Returns only on operator interrupt or fatal startup failure.
    pub async fn run(mut self) -> Result<()> {
        self.startup().await?;

        if self.options.once {
            info!("once mode: running a single cycle");
            let now = Local::now().naive_local();
            return self.run_cycle(now).await;
        }

        let mut shutdown = spawn_interrupt_watch();
        info!("update loop started");

        loop {
            tokio::select! {
                () = shutdown_signal(&mut shutdown) => break,
                () = clock::wait_for_next_tick() => {}
            }

            let now = Local::now().naive_local();
            debug!(%now, "processing tick");

            if let Err(err) = self.run_cycle(now).await {
                error!(error = %err, "cycle failed; backing off before next tick");
                tokio::time::sleep(CYCLE_FAILURE_BACKOFF).await;
            }
        }

        info!("interrupt received, update loop stopped");
        Ok(())
    }

    /// Startup sequence: repository assurance (fatal on failure), schedule
    /// banner, optional startup force-push (failure tolerated).
    async fn startup(&mut self) -> Result<()> {
        self.repo
            .ensure_initialized()
            .await
            .context("initial git setup failed")?;

        self.log_schedule();

        if self.options.force_push_on_startup {
            info!("executing startup force push");
            let copied = self.publisher.copy_into_tree();
            if copied == 0 && self.publisher.expects_artifacts() {
                warn!("no artifacts copied; skipping startup force push");
            } else {
                let now = Local::now().naive_local();
                match self.repo.force_push_cycle(now).await {
                    Ok(()) => info!("startup force push completed"),
                    Err(err) => warn!(error = %err, "startup force push failed, continuing"),
                }
            }
        }

        Ok(())
    }

    fn log_schedule(&self) {
        for job in self.registry.jobs() {
            info!(job = %job.name, trigger = %job.trigger, "scheduled job");
        }
        if self.force_push_trigger != Trigger::Disabled {
            info!(trigger = %self.force_push_trigger, "scheduled force push");
        }
    }

    /// One full tick: dispatch, refresh, copy, publish.
    ///
    /// Errors returned from here are batch failures; publish failures are
    /// logged and absorbed so the next tick retries naturally with git
    /// state re-derived fresh.
    pub async fn run_cycle(&mut self, now: NaiveDateTime) -> Result<()> {
        let ready = self.registry.ready_jobs(now, &self.state);

        // Markers are recorded at dispatch time, not completion time, so a
        // catastrophically failing daily job cannot wedge the loop on
        // endless same-day retries.
        let mut batch: Vec<(String, Arc<dyn Producer>)> = Vec::with_capacity(ready.len());
        let mut dispatched_markers = Vec::new();
        for job in ready {
            if job.updates_marker {
                dispatched_markers.push(job.name.clone());
            }
            batch.push((job.name.clone(), Arc::clone(&job.producer)));
        }
        for name in dispatched_markers {
            self.state.record_dispatch(&name, now.date());
        }

        dispatch(batch).await?;

        // Render before the copy check: the human-facing document is
        // refreshed every tick even when no artifact source is available.
        if !self.read_model.refresh().await {
            warn!("read-model refresh reported partial failure; publishing anyway");
        }

        let copied = self.publisher.copy_into_tree();
        if copied == 0 && self.publisher.expects_artifacts() {
            warn!("no artifacts copied; skipping commit this tick");
            return Ok(());
        }

        // Scheduled force-push replaces the ordinary publish path this tick.
        if self
            .force_push_trigger
            .should_run(now, self.state.force_push_marker())
        {
            info!("executing scheduled force push");
            match self.repo.force_push_cycle(now).await {
                Ok(()) => {
                    self.state.record_force_push(now.date());
                    info!("scheduled force push completed");
                }
                Err(err) => error!(error = %err, "scheduled force push failed"),
            }
            return Ok(());
        }

        let message = self.publisher.commit_message(now);
        match self.repo.commit_and_push(&message, false).await {
            Ok(PushOutcome::NoChanges) => debug!("working tree clean; nothing published"),
            Ok(PushOutcome::Pushed { commit_count }) => {
                info!(commit_count, "publish cycle completed");
            }
            Ok(PushOutcome::Compacted) => info!("history compacted and force pushed"),
            Err(err) => warn!(error = %err, "git publish failed, continuing"),
        }

        Ok(())
    }

    /// Schedule state, exposed for inspection in tests.
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }
}

/// Spawn the Ctrl-C listener feeding a watch channel.
///
/// The loop checks the channel at the top of each iteration and races it
/// against the minute sleep, so an in-flight cycle step always finishes
/// before the loop exits.
fn spawn_interrupt_watch() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(true);
    });
    rx
}

/// Resolves when shutdown was requested; pends forever if the signal
/// listener went away without ever firing.
async fn shutdown_signal(rx: &mut watch::Receiver<bool>) {
    if rx.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}
