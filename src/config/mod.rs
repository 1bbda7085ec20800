// src/config/mod.rs

//! Configuration loading and validation for gitpulse.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like schedule sanity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ArtifactSpec, ConfigFile, JobConfig, PublishSection, RepoSection, TriggerSpec};
pub use validate::validate_config;
