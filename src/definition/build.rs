// src/definition/build.rs

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::dag::{Job, JobId, Pipeline, PipelineMeta, Step};
use crate::definition::compose::expand_definition;
use crate::definition::model::{JobSpec, PipelineFile};
use crate::definition::steps::parse_step_range;
use crate::definition::validate::validate_definition;
use crate::errors::{PipesubmitError, Result};
use crate::fs::FileSystem;
use crate::resume::is_up_to_date;

/// How a definition is turned into a runnable [`Pipeline`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// 1-based step range (`"1-3,5"`); every step when `None`.
    pub step_range: Option<String>,
    /// Keep jobs whose done file is up to date.
    pub force: bool,
    /// Replaces `[pipeline].output_dir`.
    pub output_dir: Option<String>,
}

/// Sentinel used when a job does not name one.
///
/// It embeds a hash of the command, so editing a command (or its modules)
/// makes the previous run's done file irrelevant.
pub fn default_done_path(step: &str, job: &JobSpec) -> String {
    let hash = blake3::hash(job.command_with_modules().as_bytes()).to_hex();
    format!(
        "job_output/{}/{}.{}.mugqic.done",
        step,
        job.name,
        &hash.as_str()[..16]
    )
}

/// Expand composite jobs, validate `def`, select the requested steps, resolve dependencies and drop
/// jobs that are already up to date.
///
/// Dependencies of a job are its `after` entries plus every earlier
/// scheduled job that produces one of its input files. Edges to jobs that
/// are not scheduled in this run (deselected or up to date) are dropped; a
/// job that still has a scheduled dependency is never considered up to date.
pub fn build_pipeline(
    def: PipelineFile,
    opts: &BuildOptions,
    fs: &dyn FileSystem,
) -> Result<Pipeline> {
    let def = expand_definition(def)?;
    validate_definition(&def)?;

    let output_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| def.pipeline.output_dir.clone());
    let selected = match opts.step_range.as_deref() {
        Some(range) => parse_step_range(range, def.steps.len())?,
        None => (0..def.steps.len()).collect(),
    };

    // Declaration order of every job in the file.
    let declared: HashMap<&str, usize> = def
        .steps
        .iter()
        .flat_map(|s| s.jobs.iter())
        .enumerate()
        .map(|(i, j)| (j.name.as_str(), i))
        .collect();

    let mut scheduled: HashMap<&str, JobId> = HashMap::new();
    let mut producers: Vec<(JobId, &[String])> = Vec::new();
    let mut steps = Vec::with_capacity(selected.len());

    for index in selected {
        let spec = &def.steps[index];
        let mut step = Step::new(spec.name.clone());

        for job_spec in spec.jobs.iter() {
            let mut deps: Vec<JobId> = Vec::new();
            let mut add_dep = |id: &JobId| {
                if !deps.contains(id) {
                    deps.push(id.clone());
                }
            };

            for name in job_spec.after.iter() {
                if declared.get(name.as_str()) > declared.get(job_spec.name.as_str()) {
                    return Err(PipesubmitError::InvalidPipeline(format!(
                        "job '{}' must be declared after its dependency '{}'",
                        job_spec.name, name
                    )));
                }
                match scheduled.get(name.as_str()) {
                    Some(id) => add_dep(id),
                    None => debug!(
                        job = %job_spec.name,
                        dependency = %name,
                        "dependency not scheduled in this run"
                    ),
                }
            }
            for input in job_spec.input_files.iter() {
                for (id, outputs) in producers.iter() {
                    if outputs.contains(input) {
                        add_dep(id);
                    }
                }
            }

            let done = job_spec
                .done
                .clone()
                .unwrap_or_else(|| default_done_path(&spec.name, job_spec));

            if !opts.force
                && deps.is_empty()
                && is_up_to_date(
                    fs,
                    Path::new(&output_dir),
                    &done,
                    &job_spec.input_files,
                    &job_spec.output_files,
                )
            {
                info!("Job {} up to date... skipping", job_spec.name);
                continue;
            }

            let id = step.next_job_id();
            let job = Job::new(
                id.clone(),
                job_spec.name.clone(),
                job_spec.command_with_modules(),
                done,
            )
                .with_input_files(job_spec.input_files.clone())
                .with_output_files(job_spec.output_files.clone())
                .with_dependencies(deps)
                .with_samples(job_spec.samples.clone());

            scheduled.insert(job_spec.name.as_str(), id.clone());
            producers.push((id, job_spec.output_files.as_slice()));
            step.push(job);
        }

        if step.is_skipped() {
            info!(step = %step.name, "no job to run in step");
        }
        steps.push(step);
    }

    let meta = PipelineMeta::new(def.pipeline.name, def.pipeline.version, output_dir);
    Pipeline::new(meta, def.samples, def.readsets, steps)
}
