// src/config/mod.rs

//! Cluster configuration loading, validation and lookup.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load and merge config files from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Resolve typed per-family parameters (`lookup.rs`, `cluster.rs`).

pub mod cluster;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod validate;

pub use cluster::{ClusterOptions, max_jobs};
pub use loader::{load_all, load_and_validate, load_from_path};
pub use lookup::{ConfigLookup, ParamType, ParamValue};
pub use model::{ClusterConfig, DEFAULT_SECTION, RawConfigFile, Section};
