// src/engine/mod.rs

//! The main update loop.
//!
//! This module ties together:
//! - the minute-aligned clock
//! - trigger evaluation and last-run markers
//! - concurrent job dispatch
//! - the publish pipeline and git state machine
//! - Ctrl-C handling and the once-mode single cycle

pub mod runtime;

pub use runtime::{Engine, EngineOptions};
