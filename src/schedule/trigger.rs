// src/schedule/trigger.rs

use std::fmt;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::config::model::TriggerSpec;

/// When a job fires, as a pure function of the tick time and the job's
/// last-run marker.
///
/// Evaluation happens once per minute tick, so at minute 0 an
/// `EveryMinutes(15)` job and an `Hourly` job both fire in the same batch;
/// that overlap is intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fires on every tick.
    EveryTick,
    /// Fires when `now.minute % interval == 0`.
    EveryMinutes(u32),
    /// Fires at the top of every hour.
    Hourly,
    /// Fires at the given local time, at most once per calendar day.
    DailyAt { hour: u32, minute: u32 },
    /// Never fires (an unset optional schedule).
    Disabled,
}

impl Trigger {
    /// Pure, total trigger evaluation. Never fails.
    ///
    /// `marker` is the calendar date of the last dispatch for once-daily
    /// jobs; other kinds ignore it. The daily guard compares plain local
    /// dates, independent of any shifted "day boundary" used for display.
    pub fn should_run(self, now: NaiveDateTime, marker: Option<NaiveDate>) -> bool {
        match self {
            Trigger::EveryTick => true,
            Trigger::EveryMinutes(interval) => interval != 0 && now.minute() % interval == 0,
            Trigger::Hourly => now.minute() == 0,
            Trigger::DailyAt { hour, minute } => {
                if now.hour() != hour || now.minute() != minute {
                    return false;
                }
                match marker {
                    None => true,
                    Some(last) => last < now.date(),
                }
            }
            Trigger::Disabled => false,
        }
    }

    /// Whether this trigger carries a once-a-day guard, i.e. whether the
    /// engine should record a dispatch marker for it.
    pub fn uses_marker(self) -> bool {
        matches!(self, Trigger::DailyAt { .. })
    }

    /// Dispatch ordering group: every-tick jobs first, then interval jobs,
    /// then hourly, then daily. Registration order is kept within a group.
    pub(crate) fn order_group(self) -> u8 {
        match self {
            Trigger::EveryTick => 0,
            Trigger::EveryMinutes(_) => 1,
            Trigger::Hourly => 2,
            Trigger::DailyAt { .. } => 3,
            Trigger::Disabled => 4,
        }
    }

    /// Convert the TOML-facing [`TriggerSpec`] into an evaluated trigger.
    pub fn from_spec(spec: &TriggerSpec) -> Result<Self> {
        match spec {
            TriggerSpec::Named(name) => match name.trim() {
                "every_tick" => Ok(Trigger::EveryTick),
                "hourly" => Ok(Trigger::Hourly),
                other => Err(anyhow!(
                    "unknown trigger {other:?} (expected \"every_tick\" or \"hourly\")"
                )),
            },
            TriggerSpec::EveryMinutes { every_minutes } => {
                if *every_minutes == 0 {
                    return Err(anyhow!("every_minutes must be >= 1 (got 0)"));
                }
                Ok(Trigger::EveryMinutes(*every_minutes))
            }
            TriggerSpec::DailyAt { daily_at } => {
                let (hour, minute) = parse_hhmm(daily_at)?;
                Ok(Trigger::DailyAt { hour, minute })
            }
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::EveryTick => write!(f, "every tick"),
            Trigger::EveryMinutes(n) => write!(f, "every {n} minute(s)"),
            Trigger::Hourly => write!(f, "hourly"),
            Trigger::DailyAt { hour, minute } => write!(f, "daily at {hour:02}:{minute:02}"),
            Trigger::Disabled => write!(f, "disabled"),
        }
    }
}

/// Parse a `"HH:MM"` time-of-day string.
pub fn parse_hhmm(s: &str) -> Result<(u32, u32)> {
    let (h, m) = s
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("expected \"HH:MM\", got {s:?}"))?;

    let hour: u32 = h
        .parse()
        .map_err(|_| anyhow!("invalid hour in {s:?}"))?;
    let minute: u32 = m
        .parse()
        .map_err(|_| anyhow!("invalid minute in {s:?}"))?;

    if hour > 23 {
        return Err(anyhow!("hour out of range in {s:?} (expected 0-23)"));
    }
    if minute > 59 {
        return Err(anyhow!("minute out of range in {s:?} (expected 0-59)"));
    }

    Ok((hour, minute))
}
