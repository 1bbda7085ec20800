use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use gitpulse::jobs::{dispatch, Artifact, JobRegistry, JobSpec, Producer};
use gitpulse::schedule::{ScheduleState, Trigger};

type TestResult = Result<(), Box<dyn Error>>;

struct CountingProducer {
    runs: Arc<AtomicU32>,
}

#[async_trait]
impl Producer for CountingProducer {
    async fn run(&self) -> Artifact {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Artifact::Fresh("ok".to_string())
    }
}

struct FallbackProducer;

#[async_trait]
impl Producer for FallbackProducer {
    async fn run(&self) -> Artifact {
        Artifact::Fallback {
            reason: "upstream unavailable".to_string(),
        }
    }
}

struct PanickingProducer;

#[async_trait]
impl Producer for PanickingProducer {
    async fn run(&self) -> Artifact {
        panic!("producer contract violation");
    }
}

fn spec(name: &str, trigger: Trigger, producer: Arc<dyn Producer>) -> JobSpec {
    JobSpec {
        name: name.to_string(),
        trigger,
        producer,
        updates_marker: trigger.uses_marker(),
    }
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 20)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[tokio::test]
async fn fallback_artifacts_count_as_completion() -> TestResult {
    let runs = Arc::new(AtomicU32::new(0));
    let batch: Vec<(String, Arc<dyn Producer>)> = vec![
        (
            "time".to_string(),
            Arc::new(CountingProducer { runs: runs.clone() }),
        ),
        ("weather".to_string(), Arc::new(FallbackProducer)),
    ];

    dispatch(batch).await?;
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn panicking_producer_fails_batch_but_others_complete() -> TestResult {
    let runs = Arc::new(AtomicU32::new(0));
    let batch: Vec<(String, Arc<dyn Producer>)> = vec![
        ("bad".to_string(), Arc::new(PanickingProducer)),
        (
            "a".to_string(),
            Arc::new(CountingProducer { runs: runs.clone() }),
        ),
        (
            "b".to_string(),
            Arc::new(CountingProducer { runs: runs.clone() }),
        ),
    ];

    let result = dispatch(batch).await;
    assert!(result.is_err());

    // The other ready jobs in the batch still ran to completion.
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn markers_recorded_at_dispatch_survive_a_failed_batch() -> TestResult {
    let mut state = ScheduleState::new();
    let now = at(10, 0);

    // The engine records the marker before the batch runs.
    state.record_dispatch("geo", now.date());

    let batch: Vec<(String, Arc<dyn Producer>)> =
        vec![("geo".to_string(), Arc::new(PanickingProducer))];
    assert!(dispatch(batch).await.is_err());

    // Marker stays set, so the job is not retried endlessly today.
    assert_eq!(state.marker("geo"), Some(now.date()));
    let trigger = Trigger::DailyAt { hour: 10, minute: 0 };
    assert!(!trigger.should_run(now, state.marker("geo")));

    Ok(())
}

#[test]
fn registry_orders_ready_jobs_by_trigger_kind() -> TestResult {
    let runs = Arc::new(AtomicU32::new(0));
    let counting = || -> Arc<dyn Producer> {
        Arc::new(CountingProducer { runs: runs.clone() })
    };

    let registry = JobRegistry::from_specs(vec![
        spec("journal", Trigger::DailyAt { hour: 23, minute: 0 }, counting()),
        spec("geo", Trigger::DailyAt { hour: 10, minute: 0 }, counting()),
        spec("image", Trigger::Hourly, counting()),
        spec("weather", Trigger::EveryMinutes(15), counting()),
        spec("time", Trigger::EveryTick, counting()),
    ]);

    let state = ScheduleState::new();

    // At 10:00 everything except the 23:00 journal job is due: always-tick
    // first, then interval, hourly, daily.
    let ready: Vec<&str> = registry
        .ready_jobs(at(10, 0), &state)
        .iter()
        .map(|job| job.name.as_str())
        .collect();
    assert_eq!(ready, vec!["time", "weather", "image", "geo"]);

    // At 10:07 only the every-tick job fires.
    let ready: Vec<&str> = registry
        .ready_jobs(at(10, 7), &state)
        .iter()
        .map(|job| job.name.as_str())
        .collect();
    assert_eq!(ready, vec!["time"]);

    Ok(())
}

#[test]
fn registry_excludes_daily_job_already_dispatched_today() -> TestResult {
    let registry = JobRegistry::from_specs(vec![spec(
        "geo",
        Trigger::DailyAt { hour: 10, minute: 0 },
        Arc::new(FallbackProducer),
    )]);

    let mut state = ScheduleState::new();
    let now = at(10, 0);

    assert_eq!(registry.ready_jobs(now, &state).len(), 1);

    state.record_dispatch("geo", now.date());
    assert!(registry.ready_jobs(now, &state).is_empty());

    Ok(())
}
