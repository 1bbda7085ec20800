// src/jobs/mod.rs

//! Job registry and concurrent batch dispatch.
//!
//! Responsibilities:
//! - Define the producer contract every generator fulfils (`producer.rs`):
//!   an async operation that returns an artifact or a best-effort fallback
//!   and never fails.
//! - Build the immutable job registry from config, compute the ready set for
//!   a tick, and fan the ready producers out as one concurrent batch
//!   (`registry.rs`).

pub mod producer;
pub mod registry;

pub use producer::{Artifact, CommandProducer, Producer};
pub use registry::{dispatch, JobRegistry, JobSpec};
