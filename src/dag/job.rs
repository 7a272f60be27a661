// src/dag/job.rs

//! The atomic unit of work.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{PipesubmitError, Result};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"));

/// Pipeline-unique job identifier.
///
/// Rendered scripts use it as a shell variable name, so it is always a legal
/// identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !IDENTIFIER.is_match(&id) {
            return Err(PipesubmitError::InvalidPipeline(format!(
                "job id '{id}' is not a valid shell identifier"
            )));
        }
        Ok(Self(id))
    }

    /// Conventional id of the `ordinal`-th (1-based) job of a step:
    /// `<step>_<ordinal>_JOB_ID`, with any non-word character replaced.
    pub fn for_step(step_name: &str, ordinal: usize) -> Self {
        let step = NON_WORD.replace_all(step_name, "_");
        let id = if step.starts_with(|c: char| c.is_ascii_digit()) || step.is_empty() {
            format!("_{step}_{ordinal}_JOB_ID")
        } else {
            format!("{step}_{ordinal}_JOB_ID")
        };
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A command plus everything a backend needs to schedule it.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    /// `<family>.<sample or readset>[.<subpart>]`.
    pub name: String,
    /// Literal shell text, module setup included.
    pub command: String,
    pub input_files: Vec<String>,
    pub output_files: Vec<String>,
    /// Jobs that must finish before this one starts, in declaration order.
    pub dependencies: Vec<JobId>,
    /// Sentinel whose existence marks a previous successful run.
    pub done: String,
    /// Names of the samples this job reports metadata for.
    pub samples: Vec<String>,
}

impl Job {
    pub fn new(
        id: JobId,
        name: impl Into<String>,
        command: impl Into<String>,
        done: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            command: command.into(),
            input_files: Vec::new(),
            output_files: Vec::new(),
            dependencies: Vec::new(),
            done: done.into(),
            samples: Vec::new(),
        }
    }

    pub fn with_input_files(mut self, files: Vec<String>) -> Self {
        self.input_files = files;
        self
    }

    pub fn with_output_files(mut self, files: Vec<String>) -> Self {
        self.output_files = files;
        self
    }

    pub fn with_dependencies(mut self, deps: Vec<JobId>) -> Self {
        self.dependencies = deps;
        self
    }

    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }

    /// Configuration section for this job: the name up to its first `.`.
    ///
    /// A job named `trimmomatic.readset1` reads its cluster settings from
    /// `[trimmomatic]`.
    pub fn family(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}
