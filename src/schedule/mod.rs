// src/schedule/mod.rs

//! Minute-tick scheduling for gitpulse.
//!
//! Responsibilities:
//! - Align the loop to wall-clock minute boundaries (`clock.rs`).
//! - Decide, per job, whether it should fire at a given tick (`trigger.rs`).
//! - Track last-run markers for once-daily jobs (`state.rs`).

pub mod clock;
pub mod state;
pub mod trigger;

pub use clock::wait_for_next_tick;
pub use state::ScheduleState;
pub use trigger::Trigger;
