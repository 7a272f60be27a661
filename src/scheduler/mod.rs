// src/scheduler/mod.rs

//! Backends that render a [`Pipeline`] into something a runtime can execute.
//!
//! - [`cluster`] submits every job to a batch queue with dependency chains.
//! - [`sequential`] runs every job in order on the local host.
//! - [`trace`] dumps the whole graph as JSON for monitoring tools.
//! - [`render`] holds the text fragments the two script backends share.
//!
//! Rendering is pure: the same pipeline always yields the same artifact.

pub mod cluster;
pub mod render;
pub mod sequential;
pub mod trace;

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::ConfigLookup;
use crate::dag::Pipeline;
use crate::errors::Result;
use crate::types::SchedulerKind;

pub use cluster::ClusterScheduler;
pub use sequential::SequentialScheduler;
pub use trace::TraceScheduler;

/// A rendering backend.
pub trait Scheduler: Send + Sync + Debug {
    /// Name shown in the script banner.
    fn name(&self) -> &'static str;

    /// Render `pipeline`. Configuration problems abort the whole rendering;
    /// no partial artifact is returned.
    fn submit(&self, pipeline: &Pipeline) -> Result<String>;
}

/// Build the backend for `kind`, wiring in the configuration it reads.
pub fn create_scheduler(kind: SchedulerKind, config: Arc<dyn ConfigLookup>) -> Box<dyn Scheduler> {
    match kind {
        SchedulerKind::Pbs => Box::new(ClusterScheduler::new(config)),
        SchedulerKind::Batch => Box::new(SequentialScheduler::new()),
        SchedulerKind::Daemon => Box::new(TraceScheduler::new(config)),
    }
}

/// Same as [`create_scheduler`], from a backend name such as `"pbs"`.
pub fn create_scheduler_by_name(
    name: &str,
    config: Arc<dyn ConfigLookup>,
) -> Result<Box<dyn Scheduler>> {
    let kind: SchedulerKind = name.parse()?;
    Ok(create_scheduler(kind, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClusterConfig;
    use crate::errors::PipesubmitError;

    fn config() -> Arc<dyn ConfigLookup> {
        Arc::new(ClusterConfig::default())
    }

    #[test]
    fn factory_accepts_names_and_aliases() {
        for (name, expected) in [
            ("pbs", "ClusterScheduler"),
            ("cluster", "ClusterScheduler"),
            ("batch", "SequentialScheduler"),
            ("Sequential", "SequentialScheduler"),
            ("daemon", "TraceScheduler"),
            ("trace", "TraceScheduler"),
        ] {
            assert_eq!(create_scheduler_by_name(name, config()).unwrap().name(), expected);
        }
    }

    #[test]
    fn factory_rejects_unknown_names() {
        match create_scheduler_by_name("slurm", config()) {
            Err(PipesubmitError::UnknownScheduler(name)) => assert_eq!(name, "slurm"),
            other => panic!("expected UnknownScheduler, got {:?}", other.map(|s| s.name())),
        }
    }
}
