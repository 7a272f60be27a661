// src/scheduler/trace.rs

//! JSON snapshot of a pipeline for external monitoring tools.
//!
//! Key names are an external contract; field order follows struct order.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::config::{ClusterOptions, ConfigLookup};
use crate::dag::{Job, Pipeline, Step};
use crate::errors::Result;
use crate::sample::{Readset, Sample};
use crate::scheduler::Scheduler;

#[derive(Debug, Serialize)]
pub struct TraceDocument<'a> {
    pub pipeline: TracePipeline<'a>,
}

#[derive(Debug, Serialize)]
pub struct TracePipeline<'a> {
    pub output_dir: &'a str,
    pub samples: Vec<TraceSample<'a>>,
    pub steps: Vec<TraceStep<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TraceSample<'a> {
    pub name: &'a str,
    pub readsets: Vec<TraceReadset<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TraceReadset<'a> {
    pub name: &'a str,
    pub library: Option<&'a str>,
    #[serde(rename = "runType")]
    pub run_type: &'static str,
    pub run: Option<&'a str>,
    pub lane: Option<&'a str>,
    pub adapter1: Option<&'a str>,
    pub adapter2: Option<&'a str>,
    #[serde(rename = "qualityoffset")]
    pub quality_offset: Option<u32>,
    pub bed: &'a [String],
    pub fastq1: Option<&'a str>,
    pub fastq2: Option<&'a str>,
    pub bam: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct TraceStep<'a> {
    pub name: &'a str,
    pub jobs: Vec<TraceJob<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TraceJob<'a> {
    pub job_name: &'a str,
    pub job_id: &'a str,
    pub job_command: &'a str,
    pub job_input_files: &'a [String],
    pub job_output_files: &'a [String],
    pub job_dependencies: Vec<&'a str>,
    pub job_cluster_options: TraceClusterOptions,
    pub job_done: &'a str,
}

/// Cluster options with the per-job values already spliced in.
#[derive(Debug, Serialize)]
pub struct TraceClusterOptions {
    pub cluster_submit_cmd: String,
    pub cluster_other_arg: String,
    pub cluster_work_dir_arg: String,
    pub cluster_output_dir_arg: String,
    pub cluster_job_name_arg: String,
    pub cluster_walltime: String,
    pub cluster_queue: String,
    pub cluster_cpu: String,
}

impl<'a> From<&'a Readset> for TraceReadset<'a> {
    fn from(r: &'a Readset) -> Self {
        Self {
            name: &r.name,
            library: r.library.as_deref(),
            run_type: r.run_type.as_str(),
            run: r.run.as_deref(),
            lane: r.lane.as_deref(),
            adapter1: r.adapter1.as_deref(),
            adapter2: r.adapter2.as_deref(),
            quality_offset: r.quality_offset,
            bed: &r.beds,
            fastq1: r.fastq1.as_deref(),
            fastq2: r.fastq2.as_deref(),
            bam: r.bam.as_deref(),
        }
    }
}

/// Renders the pipeline as one JSON document instead of a script.
#[derive(Debug, Clone)]
pub struct TraceScheduler {
    config: Arc<dyn ConfigLookup>,
}

impl TraceScheduler {
    pub fn new(config: Arc<dyn ConfigLookup>) -> Self {
        Self { config }
    }

    /// Build the document without serializing it.
    pub fn document<'p>(&self, pipeline: &'p Pipeline) -> Result<TraceDocument<'p>> {
        let mut families: BTreeMap<&str, ClusterOptions> = BTreeMap::new();
        let mut steps = Vec::with_capacity(pipeline.steps().len());

        for step in pipeline.steps() {
            let mut jobs = Vec::with_capacity(step.jobs.len());
            for job in &step.jobs {
                let family = job.family();
                if !families.contains_key(family) {
                    families.insert(family, ClusterOptions::resolve(self.config.as_ref(), family)?);
                }
                jobs.push(trace_job(pipeline, step, job, &families[family]));
            }
            steps.push(TraceStep {
                name: &step.name,
                jobs,
            });
        }

        Ok(TraceDocument {
            pipeline: TracePipeline {
                output_dir: pipeline.output_dir(),
                samples: pipeline.samples().iter().map(|s| trace_sample(pipeline, s)).collect(),
                steps,
            },
        })
    }
}

fn trace_sample<'p>(pipeline: &'p Pipeline, sample: &'p Sample) -> TraceSample<'p> {
    TraceSample {
        name: &sample.name,
        readsets: pipeline.readsets_of(&sample.name).map(TraceReadset::from).collect(),
    }
}

fn trace_job<'p>(
    pipeline: &'p Pipeline,
    step: &'p Step,
    job: &'p Job,
    opts: &ClusterOptions,
) -> TraceJob<'p> {
    let output_dir = pipeline.output_dir().trim_end_matches('/');
    TraceJob {
        job_name: &job.name,
        job_id: job.id.as_str(),
        job_command: &job.command,
        job_input_files: &job.input_files,
        job_output_files: &job.output_files,
        job_dependencies: job.dependencies.iter().map(|id| id.as_str()).collect(),
        job_cluster_options: TraceClusterOptions {
            cluster_submit_cmd: opts.submit_cmd.clone(),
            cluster_other_arg: opts.other_arg.clone(),
            cluster_work_dir_arg: format!("{} {}", opts.work_dir_arg, pipeline.output_dir()),
            cluster_output_dir_arg: format!(
                "{} {}/job_output/{}/{}.o",
                opts.output_dir_arg, output_dir, step.name, job.name
            ),
            cluster_job_name_arg: format!("{} {}", opts.job_name_arg, job.name),
            cluster_walltime: opts.walltime.clone(),
            cluster_queue: opts.queue.clone(),
            cluster_cpu: opts.cpu.clone(),
        },
        job_done: &job.done,
    }
}

impl Scheduler for TraceScheduler {
    fn name(&self) -> &'static str {
        "TraceScheduler"
    }

    fn submit(&self, pipeline: &Pipeline) -> Result<String> {
        let document = self.document(pipeline)?;

        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        document.serialize(&mut ser)?;
        buf.push(b'\n');

        String::from_utf8(buf).map_err(|e| anyhow::anyhow!("trace document is not UTF-8: {e}").into())
    }
}
