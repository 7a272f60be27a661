// src/definition/model.rs

use serde::Deserialize;

use crate::sample::{Readset, Sample};

/// A pipeline definition as read from a TOML file.
///
/// ```toml
/// [pipeline]
/// name = "DnaSeq"
/// version = "1.0"
/// output_dir = "/scratch/project"
///
/// [[sample]]
/// name = "sample1"
///
/// [[readset]]
/// name = "readset1"
/// sample = "sample1"
/// run_type = "PAIRED_END"
///
/// [[step]]
/// name = "trim"
///
/// [[step.job]]
/// name = "trimmomatic.readset1"
/// command = "java -jar trimmomatic.jar ..."
/// modules = ["mugqic/java/openjdk-jdk1.7.0_60"]
/// input_files = ["raw/readset1.pair1.fastq.gz"]
/// output_files = ["trim/sample1/readset1.trim.pair1.fastq.gz"]
/// samples = ["sample1"]
///
/// [[step]]
/// name = "bwa_mem_sort"
///
/// [[step.job]]
/// name = "bwa_mem_sort.readset1"
/// samples = ["sample1"]
///
/// [[step.job.pipe]]
/// command = "bwa mem ref trim/sample1/readset1.trim.pair1.fastq.gz"
/// input_files = ["trim/sample1/readset1.trim.pair1.fastq.gz"]
///
/// [[step.job.pipe]]
/// command = "samtools sort -o align/readset1.bam -"
/// output_files = ["align/readset1.bam"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineFile {
    pub pipeline: PipelineSection,

    #[serde(default, rename = "sample")]
    pub samples: Vec<Sample>,

    #[serde(default, rename = "readset")]
    pub readsets: Vec<Readset>,

    /// Every defined step, in order; a run selects a range of them.
    #[serde(default, rename = "step")]
    pub steps: Vec<StepSpec>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    pub output_dir: String,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// `[[step]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    pub name: String,

    #[serde(default, rename = "job")]
    pub jobs: Vec<JobSpec>,
}

/// `[[step.job]]` entry: a job before ids and dependencies are resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobSpec {
    /// Optional on the parts of a composite job only.
    #[serde(default)]
    pub name: String,

    /// Empty for composite jobs, which build it from `pipe` or `concat`.
    #[serde(default)]
    pub command: String,

    /// Environment modules loaded before the command runs.
    #[serde(default)]
    pub modules: Vec<String>,

    #[serde(default)]
    pub input_files: Vec<String>,

    #[serde(default)]
    pub output_files: Vec<String>,

    /// Names of jobs this one waits for, on top of those producing its
    /// input files.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub samples: Vec<String>,

    /// Explicit sentinel path; derived from the step, name and command when
    /// absent.
    #[serde(default)]
    pub done: Option<String>,

    /// Parts whose commands are chained with pipes (see
    /// [`pipe_jobs`](crate::definition::compose::pipe_jobs)).
    #[serde(default)]
    pub pipe: Vec<JobSpec>,

    /// Parts run one after the other (see
    /// [`concat_jobs`](crate::definition::compose::concat_jobs)).
    #[serde(default)]
    pub concat: Vec<JobSpec>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    /// The command with its `module load` prefix, if any.
    pub fn command_with_modules(&self) -> String {
        if self.modules.is_empty() {
            self.command.clone()
        } else {
            format!("module load {} && \\\n{}", self.modules.join(" "), self.command)
        }
    }
}
