// src/definition/mod.rs

//! Pipeline definitions: the TOML description of samples, steps and jobs,
//! and how it becomes a [`Pipeline`](crate::dag::Pipeline).

pub mod build;
pub mod compose;
pub mod loader;
pub mod model;
pub mod steps;
pub mod validate;

pub use build::{build_pipeline, default_done_path, BuildOptions};
pub use compose::{concat_jobs, expand_composite, expand_definition, pipe_jobs};
pub use loader::load_definition;
pub use model::{JobSpec, PipelineFile, PipelineSection, StepSpec};
pub use steps::parse_step_range;
pub use validate::validate_definition;
