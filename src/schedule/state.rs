// src/schedule/state.rs

use std::collections::HashMap;

use chrono::NaiveDate;

/// Last-run markers for once-daily jobs, plus the scheduled force-push.
///
/// Owned by the engine and mutated only between awaits; nothing here is
/// persisted, so a restart treats every marker as unset and once-daily jobs
/// simply rerun at their next scheduled time.
///
/// Markers are recorded at *dispatch* time, not completion time. A job that
/// fails catastrophically after dispatch is skipped for the rest of the day
/// rather than retried forever.
#[derive(Debug, Default)]
pub struct ScheduleState {
    markers: HashMap<String, NaiveDate>,
    force_push: Option<NaiveDate>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker for a job, or `None` if it has never been dispatched.
    pub fn marker(&self, job: &str) -> Option<NaiveDate> {
        self.markers.get(job).copied()
    }

    /// Record that a job was dispatched on the given date.
    pub fn record_dispatch(&mut self, job: &str, date: NaiveDate) {
        self.markers.insert(job.to_string(), date);
    }

    /// Date of the last successful scheduled force-push, if any.
    pub fn force_push_marker(&self) -> Option<NaiveDate> {
        self.force_push
    }

    /// Record a successful scheduled force-push.
    pub fn record_force_push(&mut self, date: NaiveDate) {
        self.force_push = Some(date);
    }
}
