#![allow(dead_code)]

use std::sync::Arc;

use pipesubmit::config::{ClusterConfig, ConfigLookup, DEFAULT_SECTION, RawConfigFile};
use pipesubmit::dag::{Job, JobId, Pipeline, PipelineMeta, Step};
use pipesubmit::sample::{Readset, Sample};
use pipesubmit::types::RunType;

/// Fixed creation time so renderings can be compared across runs.
pub const TEST_TIMESTAMP: &str = "2024-01-01T00.00.00";

/// Builder for `ClusterConfig` to simplify test setup.
pub struct ClusterConfigBuilder {
    config: RawConfigFile,
}

impl ClusterConfigBuilder {
    /// No section at all.
    pub fn empty() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// A complete PBS-style `[DEFAULT]` section.
    pub fn new() -> Self {
        Self::empty()
            .set(DEFAULT_SECTION, "cluster_submit_cmd", "qsub")
            .set(DEFAULT_SECTION, "cluster_other_arg", "-m ae -M $JOB_MAIL")
            .set(DEFAULT_SECTION, "cluster_work_dir_arg", "-d")
            .set(DEFAULT_SECTION, "cluster_output_dir_arg", "-j oe -o")
            .set(DEFAULT_SECTION, "cluster_job_name_arg", "-N")
            .set(DEFAULT_SECTION, "cluster_walltime", "-l walltime=24:00:00")
            .set(DEFAULT_SECTION, "cluster_queue", "-q sw")
            .set(DEFAULT_SECTION, "cluster_cpu", "-l nodes=1:ppn=1")
            .set(DEFAULT_SECTION, "cluster_dependency_arg", "-W depend=afterok:")
            .set(DEFAULT_SECTION, "cluster_submit_cmd_suffix", "| grep \"[0-9]\"")
            .set(DEFAULT_SECTION, "cluster_cmd_produces_job_id", true)
    }

    pub fn set(mut self, section: &str, key: &str, value: impl Into<toml::Value>) -> Self {
        self.config
            .sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> ClusterConfig {
        ClusterConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }

    pub fn build_lookup(self) -> Arc<dyn ConfigLookup> {
        Arc::new(self.build())
    }
}

impl Default for ClusterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a ready-made `Pipeline`, bypassing definition files.
pub struct PipelineBuilder {
    name: String,
    version: String,
    output_dir: String,
    samples: Vec<Sample>,
    readsets: Vec<Readset>,
    steps: Vec<Step>,
}

impl PipelineBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0".to_string(),
            output_dir: "/out".to_string(),
            samples: vec![],
            readsets: vec![],
            steps: vec![],
        }
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.output_dir = dir.to_string();
        self
    }

    pub fn sample(mut self, name: &str) -> Self {
        self.samples.push(Sample::new(name));
        self
    }

    pub fn readset(mut self, name: &str, sample: &str) -> Self {
        let mut readset = Readset::new(name, sample, RunType::PairedEnd);
        readset.run = Some("run1".to_string());
        readset.lane = Some("1".to_string());
        readset.fastq1 = Some(format!("raw/{name}.pair1.fastq.gz"));
        readset.fastq2 = Some(format!("raw/{name}.pair2.fastq.gz"));
        self.readsets.push(readset);
        self
    }

    pub fn step(mut self, step: StepBuilder) -> Self {
        self.steps.push(step.build());
        self
    }

    pub fn build(self) -> Pipeline {
        let meta = PipelineMeta::new(self.name, self.version, self.output_dir)
            .with_timestamp(TEST_TIMESTAMP);
        Pipeline::new(meta, self.samples, self.readsets, self.steps)
            .expect("Failed to build valid pipeline from builder")
    }
}

/// Builder for a `Step`; jobs get ids in push order.
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            step: Step::new(name),
        }
    }

    pub fn job(mut self, job: JobBuilder) -> Self {
        let id = self.step.next_job_id();
        self.step.push(job.build(id));
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}

/// Builder for a `Job` whose id is assigned by its step.
pub struct JobBuilder {
    name: String,
    command: String,
    done: Option<String>,
    input_files: Vec<String>,
    output_files: Vec<String>,
    dependencies: Vec<JobId>,
    samples: Vec<String>,
}

impl JobBuilder {
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            done: None,
            input_files: vec![],
            output_files: vec![],
            dependencies: vec![],
            samples: vec![],
        }
    }

    /// Defaults to `job_output/<name>.done`.
    pub fn done(mut self, path: &str) -> Self {
        self.done = Some(path.to_string());
        self
    }

    pub fn input(mut self, path: &str) -> Self {
        self.input_files.push(path.to_string());
        self
    }

    pub fn output(mut self, path: &str) -> Self {
        self.output_files.push(path.to_string());
        self
    }

    /// Depend on the job carrying `id`, e.g. `"trim_1_JOB_ID"`.
    pub fn after(mut self, id: &str) -> Self {
        self.dependencies
            .push(JobId::new(id).expect("invalid job id in test"));
        self
    }

    pub fn sample(mut self, name: &str) -> Self {
        self.samples.push(name.to_string());
        self
    }

    pub fn build(self, id: JobId) -> Job {
        let done = self
            .done
            .unwrap_or_else(|| format!("job_output/{}.done", self.name));
        Job::new(id, self.name, self.command, done)
            .with_input_files(self.input_files)
            .with_output_files(self.output_files)
            .with_dependencies(self.dependencies)
            .with_samples(self.samples)
    }
}
