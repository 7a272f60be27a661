// src/dag/mod.rs

//! Job graph data model.
//!
//! - [`job`] holds the atomic unit of work and its identifier type.
//! - [`step`] groups jobs into one pipeline stage.
//! - [`pipeline`] is the finalized, immutable graph handed to a scheduler.
//! - [`graph`] is a name-keyed petgraph view used to reject cycles while a
//!   definition is still being resolved.

pub mod graph;
pub mod job;
pub mod pipeline;
pub mod step;

pub use graph::JobGraph;
pub use job::{Job, JobId};
pub use pipeline::{Pipeline, PipelineMeta};
pub use step::Step;
