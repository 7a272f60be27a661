// src/dag/step.rs

use crate::dag::job::{Job, JobId};

/// A named pipeline stage. An empty step is legal and reported as skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub jobs: Vec<Job>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Vec::new(),
        }
    }

    /// Id the next pushed job should carry.
    pub fn next_job_id(&self) -> JobId {
        JobId::for_step(&self.name, self.jobs.len() + 1)
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn is_skipped(&self) -> bool {
        self.jobs.is_empty()
    }
}
