use std::error::Error;

use chrono::{NaiveDate, NaiveDateTime};

use gitpulse::schedule::clock::millis_until_boundary;
use gitpulse::schedule::trigger::{parse_hhmm, Trigger};
use gitpulse::schedule::ScheduleState;

type TestResult = Result<(), Box<dyn Error>>;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 20)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn day_after_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 21)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn fixed_interval_fires_only_on_quarter_minutes() -> TestResult {
    let trigger = Trigger::EveryMinutes(15);

    for minute in 0..60 {
        let expected = matches!(minute, 0 | 15 | 30 | 45);
        assert_eq!(
            trigger.should_run(at(9, minute), None),
            expected,
            "minute {minute}"
        );
    }

    Ok(())
}

#[test]
fn hourly_fires_only_at_minute_zero() -> TestResult {
    assert!(Trigger::Hourly.should_run(at(14, 0), None));
    assert!(!Trigger::Hourly.should_run(at(14, 1), None));
    assert!(!Trigger::Hourly.should_run(at(14, 59), None));
    Ok(())
}

#[test]
fn every_tick_always_fires_and_disabled_never_does() -> TestResult {
    for minute in [0, 7, 30, 59] {
        assert!(Trigger::EveryTick.should_run(at(3, minute), None));
        assert!(!Trigger::Disabled.should_run(at(3, minute), None));
    }
    Ok(())
}

#[test]
fn daily_guard_is_idempotent_within_a_day() -> TestResult {
    let trigger = Trigger::DailyAt { hour: 10, minute: 0 };
    let now = at(10, 0);

    // Unset marker or a prior date: fires.
    assert!(trigger.should_run(now, None));
    let yesterday = NaiveDate::from_ymd_opt(2025, 6, 19).unwrap();
    assert!(trigger.should_run(now, Some(yesterday)));

    // Marker from the same calendar date: suppressed.
    assert!(!trigger.should_run(now, Some(now.date())));

    // Wrong minute never fires, regardless of marker.
    assert!(!trigger.should_run(at(10, 1), None));
    assert!(!trigger.should_run(at(9, 0), None));

    Ok(())
}

#[test]
fn daily_trigger_fires_exactly_once_per_simulated_day() -> TestResult {
    let trigger = Trigger::DailyAt { hour: 10, minute: 0 };
    let mut state = ScheduleState::new();
    let start = at(0, 0);

    let mut fires_day_one = 0;
    let mut fires_day_two = 0;

    // Two simulated days of minute ticks, updating the marker at dispatch
    // time the way the engine does.
    for tick in 0..(2 * 1440) {
        let now = start + chrono::Duration::minutes(tick);
        if trigger.should_run(now, state.marker("geo")) {
            state.record_dispatch("geo", now.date());
            if tick < 1440 {
                fires_day_one += 1;
            } else {
                fires_day_two += 1;
            }
        }
    }

    assert_eq!(fires_day_one, 1);
    assert_eq!(fires_day_two, 1);
    Ok(())
}

#[test]
fn geo_scenario_marker_excludes_second_firing() -> TestResult {
    let trigger = Trigger::DailyAt { hour: 10, minute: 0 };
    let now = at(10, 0);

    // No prior marker: included in the batch.
    assert!(trigger.should_run(now, None));

    // Same tick again with the marker recorded for 2025-06-20: excluded.
    let marker = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
    assert!(!trigger.should_run(now, Some(marker)));

    // Next day it fires again.
    assert!(trigger.should_run(day_after_at(10, 0), Some(marker)));

    Ok(())
}

#[test]
fn zero_interval_is_total_and_never_fires() -> TestResult {
    // Config validation rejects 0, but evaluation must stay total anyway.
    assert!(!Trigger::EveryMinutes(0).should_run(at(5, 0), None));
    Ok(())
}

#[test]
fn parse_hhmm_accepts_valid_and_rejects_invalid_times() -> TestResult {
    assert_eq!(parse_hhmm("10:00")?, (10, 0));
    assert_eq!(parse_hhmm("23:59")?, (23, 59));
    assert_eq!(parse_hhmm(" 04:30 ")?, (4, 30));

    assert!(parse_hhmm("24:00").is_err());
    assert!(parse_hhmm("10:60").is_err());
    assert!(parse_hhmm("1000").is_err());
    assert!(parse_hhmm("aa:bb").is_err());

    Ok(())
}

#[test]
fn minute_boundary_wait_saturates_at_zero() -> TestResult {
    assert_eq!(millis_until_boundary(0, 0), 60_000);
    assert_eq!(millis_until_boundary(59, 500), 500);
    // Leap second reads as second 60; the wait clamps to zero instead of
    // underflowing.
    assert_eq!(millis_until_boundary(60, 1), 0);
    Ok(())
}
