// src/jobs/registry.rs

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::model::ConfigFile;
use crate::jobs::producer::{Artifact, CommandProducer, Producer};
use crate::schedule::state::ScheduleState;
use crate::schedule::trigger::Trigger;

/// One named, independently-triggered unit of work.
pub struct JobSpec {
    pub name: String,
    pub trigger: Trigger,
    pub producer: Arc<dyn Producer>,
    /// Whether dispatching this job records a once-daily marker.
    pub updates_marker: bool,
}

/// Immutable set of jobs, constructed once at startup.
///
/// Jobs are held in dispatch order: every-tick jobs first, then interval
/// jobs, then hourly, then daily, keeping registration order within each
/// group.
pub struct JobRegistry {
    jobs: Vec<JobSpec>,
}

impl JobRegistry {
    /// Build the registry from a validated config, wiring each job to a
    /// [`CommandProducer`] for its configured generator command.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut jobs = Vec::with_capacity(cfg.job.len());

        for (name, jc) in cfg.job.iter() {
            let trigger = Trigger::from_spec(&jc.trigger)?;
            jobs.push(JobSpec {
                name: name.clone(),
                trigger,
                producer: Arc::new(CommandProducer::new(name.clone(), jc.cmd.clone())),
                updates_marker: trigger.uses_marker(),
            });
        }

        jobs.sort_by_key(|job| job.trigger.order_group());
        Ok(Self { jobs })
    }

    /// Build a registry directly from job specs, in dispatch order.
    /// Mostly useful for tests and embedding.
    pub fn from_specs(mut jobs: Vec<JobSpec>) -> Self {
        jobs.sort_by_key(|job| job.trigger.order_group());
        Self { jobs }
    }

    pub fn jobs(&self) -> &[JobSpec] {
        &self.jobs
    }

    /// The ordered set of jobs whose triggers fire at this tick.
    ///
    /// Pure with respect to `state`; marker updates are the engine's call,
    /// made immediately after this (at dispatch time, not completion time).
    pub fn ready_jobs(&self, now: NaiveDateTime, state: &ScheduleState) -> Vec<&JobSpec> {
        self.jobs
            .iter()
            .filter(|job| job.trigger.should_run(now, state.marker(&job.name)))
            .collect()
    }
}

/// Run one batch of ready jobs concurrently and wait for all of them.
///
/// Every producer is spawned as its own task (fan-out) and the batch
/// suspends until each has finished (fan-in), so one job's slow network
/// call never blocks another's.
///
/// Producers never fail by contract; a fallback artifact is logged and
/// counts as completion. A panicking producer violates the contract: the
/// rest of the batch still runs to completion, then the violation is
/// returned as an error so the engine can abort the current cycle.
pub async fn dispatch(batch: Vec<(String, Arc<dyn Producer>)>) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = batch.iter().map(|(name, _)| name.as_str()).collect();
    info!(jobs = ?names, "dispatching batch");

    let mut set = JoinSet::new();
    for (name, producer) in batch {
        set.spawn(async move {
            let artifact = producer.run().await;
            (name, artifact)
        });
    }

    let mut violation = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((name, Artifact::Fresh(_))) => {
                debug!(job = %name, "job completed with fresh artifact");
            }
            Ok((name, Artifact::Fallback { reason })) => {
                warn!(job = %name, reason = %reason, "job degraded to fallback artifact");
            }
            Err(err) => {
                // Keep draining so the remaining jobs in the batch finish.
                violation = Some(err);
            }
        }
    }

    match violation {
        Some(err) => Err(anyhow!("producer violated its no-fail contract: {err}")),
        None => {
            info!("batch completed");
            Ok(())
        }
    }
}
