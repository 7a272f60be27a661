// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipesubmitError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing required parameter '{key}' in section [{section}] (and [DEFAULT])")]
    MissingParam { section: String, key: String },

    #[error("Invalid value {value} for parameter '{key}' in section [{section}]: expected {expected}")]
    InvalidParam {
        section: String,
        key: String,
        expected: &'static str,
        value: String,
    },

    #[error("Unknown job scheduler: \"{0}\" (expected pbs, batch or daemon)")]
    UnknownScheduler(String),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Cycle detected in job DAG: {0}")]
    DagCycle(String),

    #[error("Job name collision: {0}")]
    NameCollision(String),

    #[error("Invalid step range: {0}")]
    StepRange(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipesubmitError>;
