// src/schedule/clock.rs

use std::time::Duration;

use chrono::{Local, Timelike};
use tracing::debug;

/// Extra delay past the minute boundary, so triggers never race the
/// boundary itself.
const TICK_BUFFER: Duration = Duration::from_secs(1);

/// Suspend until the wall clock reaches the next minute boundary, then a
/// short buffer on top.
///
/// Sleeping cannot fail. If the process was preempted past a boundary, the
/// computed wait is near zero and this returns almost immediately; missed
/// ticks are never queued or replayed, so a long stall skips straight to
/// "now" instead of catching up.
pub async fn wait_for_next_tick() {
    let now = Local::now();
    let wait_ms = millis_until_boundary(now.second(), now.timestamp_subsec_millis());

    debug!(wait_ms, "waiting until next minute boundary");
    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    tokio::time::sleep(TICK_BUFFER).await;
}

/// Milliseconds remaining in the current minute, given the current second
/// and sub-second millis. Saturates at zero (leap seconds report second 60).
pub fn millis_until_boundary(second: u32, subsec_millis: u32) -> u64 {
    let elapsed = u64::from(second) * 1000 + u64::from(subsec_millis);
    60_000u64.saturating_sub(elapsed)
}
