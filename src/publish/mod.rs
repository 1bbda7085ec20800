// src/publish/mod.rs

//! Working-tree publication.
//!
//! Responsibilities:
//! - Copy the generated artifact files into the working tree, best-effort
//!   per file (`pipeline.rs`).
//! - Build the commit message for a cycle from the producer-written message
//!   file, with a timestamped fallback (`pipeline.rs`).
//! - The read-model refresh seam that renders the human-facing document
//!   into the working tree (`read_model.rs`).

pub mod pipeline;
pub mod read_model;

pub use pipeline::Publisher;
pub use read_model::{CommandRefresh, NoopRefresh, ReadModel};
