// src/dag/pipeline.rs

use std::collections::HashSet;

use tracing::debug;

use crate::dag::job::{Job, JobId};
use crate::dag::step::Step;
use crate::errors::{PipesubmitError, Result};
use crate::sample::{Readset, Sample};

/// Run metadata, fixed when the pipeline is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineMeta {
    /// Pipeline identity, e.g. `DnaSeq`; also names the job list file.
    pub name: String,
    pub version: String,
    /// Creation time, `%Y-%m-%dT%H.%M.%S`.
    pub timestamp: String,
    /// Root that relative job paths resolve against.
    pub output_dir: String,
}

impl PipelineMeta {
    /// Metadata stamped with the current local time.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            timestamp: chrono::Local::now().format("%Y-%m-%dT%H.%M.%S").to_string(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

/// The selected steps of one run plus everything the schedulers render.
///
/// Immutable once built; `Pipeline::new` checks the input contract every
/// backend relies on:
/// - step names and job ids are unique,
/// - every dependency names a job that appears *earlier* in the flattened
///   job list,
/// - every sample reference (jobs and readsets) is known.
#[derive(Debug, Clone)]
pub struct Pipeline {
    meta: PipelineMeta,
    samples: Vec<Sample>,
    readsets: Vec<Readset>,
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(
        meta: PipelineMeta,
        samples: Vec<Sample>,
        readsets: Vec<Readset>,
        steps: Vec<Step>,
    ) -> Result<Self> {
        let pipeline = Self {
            meta,
            samples,
            readsets,
            steps,
        };
        pipeline.validate()?;
        debug!(
            pipeline = %pipeline.meta.name,
            steps = pipeline.steps.len(),
            jobs = pipeline.job_count(),
            "pipeline assembled"
        );
        Ok(pipeline)
    }

    fn validate(&self) -> Result<()> {
        let sample_names: HashSet<&str> = self.samples.iter().map(|s| s.name.as_str()).collect();
        if sample_names.len() != self.samples.len() {
            return Err(PipesubmitError::InvalidPipeline(
                "sample names must be unique".to_string(),
            ));
        }

        for readset in &self.readsets {
            if !sample_names.contains(readset.sample.as_str()) {
                return Err(PipesubmitError::InvalidPipeline(format!(
                    "readset '{}' belongs to unknown sample '{}'",
                    readset.name, readset.sample
                )));
            }
        }

        let mut step_names = HashSet::new();
        for step in &self.steps {
            if !step_names.insert(step.name.as_str()) {
                return Err(PipesubmitError::InvalidPipeline(format!(
                    "duplicate step '{}'",
                    step.name
                )));
            }
        }

        // Ids seen so far, in flattened order.
        let mut seen: HashSet<&JobId> = HashSet::new();
        for job in self.jobs() {
            for dep in &job.dependencies {
                if !seen.contains(dep) {
                    return Err(PipesubmitError::InvalidPipeline(format!(
                        "job '{}' depends on '{}', which is not an earlier job of this pipeline",
                        job.name, dep
                    )));
                }
            }
            for sample in &job.samples {
                if !sample_names.contains(sample.as_str()) {
                    return Err(PipesubmitError::InvalidPipeline(format!(
                        "job '{}' references unknown sample '{}'",
                        job.name, sample
                    )));
                }
            }
            if !seen.insert(&job.id) {
                return Err(PipesubmitError::InvalidPipeline(format!(
                    "duplicate job id '{}'",
                    job.id
                )));
            }
        }

        Ok(())
    }

    pub fn meta(&self) -> &PipelineMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn output_dir(&self) -> &str {
        &self.meta.output_dir
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Readsets of one sample, in pipeline order.
    pub fn readsets_of<'a>(&'a self, sample: &'a str) -> impl Iterator<Item = &'a Readset> + 'a {
        self.readsets.iter().filter(move |r| r.sample == sample)
    }

    pub fn sample(&self, name: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Every job of every selected step, step order then job order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.steps.iter().flat_map(|step| step.jobs.iter())
    }

    pub fn job_count(&self) -> usize {
        self.steps.iter().map(|s| s.jobs.len()).sum()
    }

    pub fn has_jobs(&self) -> bool {
        self.steps.iter().any(|s| !s.jobs.is_empty())
    }

    pub fn job(&self, id: &JobId) -> Option<&Job> {
        self.jobs().find(|job| &job.id == id)
    }
}
