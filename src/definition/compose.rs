// src/definition/compose.rs

//! Combine several tool invocations into one job.

use crate::definition::model::{JobSpec, PipelineFile};
use crate::errors::{PipesubmitError, Result};

fn union(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

fn union_all(jobs: &[JobSpec], field: impl Fn(&JobSpec) -> &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for job in jobs {
        union(&mut out, field(job));
    }
    out
}

/// Run `jobs` one after the other, stopping at the first failure.
///
/// Files, modules, samples and `after` edges are merged without duplicates.
pub fn concat_jobs(jobs: &[JobSpec], name: impl Into<String>) -> JobSpec {
    JobSpec {
        name: name.into(),
        command: jobs
            .iter()
            .map(|j| j.command.as_str())
            .collect::<Vec<_>>()
            .join(" && \\\n"),
        modules: union_all(jobs, |j| j.modules.as_slice()),
        input_files: union_all(jobs, |j| j.input_files.as_slice()),
        output_files: union_all(jobs, |j| j.output_files.as_slice()),
        after: union_all(jobs, |j| j.after.as_slice()),
        samples: union_all(jobs, |j| j.samples.as_slice()),
        done: None,
        pipe: Vec::new(),
        concat: Vec::new(),
    }
}

/// Stream each job's stdout into the next one.
///
/// Inputs come from the first job, outputs from the last; intermediate
/// files never touch the disk.
pub fn pipe_jobs(jobs: &[JobSpec], name: impl Into<String>) -> JobSpec {
    JobSpec {
        name: name.into(),
        command: jobs
            .iter()
            .map(|j| j.command.as_str())
            .collect::<Vec<_>>()
            .join(" | \\\n"),
        modules: union_all(jobs, |j| j.modules.as_slice()),
        input_files: jobs.first().map(|j| j.input_files.clone()).unwrap_or_default(),
        output_files: jobs.last().map(|j| j.output_files.clone()).unwrap_or_default(),
        after: union_all(jobs, |j| j.after.as_slice()),
        samples: union_all(jobs, |j| j.samples.as_slice()),
        done: None,
        pipe: Vec::new(),
        concat: Vec::new(),
    }
}

/// Turn a job declared with `pipe` or `concat` parts into a plain job.
///
/// Parts may be composite themselves. Files, modules, samples and `after`
/// set on the outer job are added to what the parts declare; `done` comes
/// from the outer job only. Plain jobs are returned unchanged.
pub fn expand_composite(job: JobSpec) -> Result<JobSpec> {
    let JobSpec {
        name,
        command,
        modules,
        input_files,
        output_files,
        after,
        samples,
        done,
        pipe,
        concat,
    } = job;

    let invalid =
        |name: &str, msg: &str| PipesubmitError::InvalidPipeline(format!("job '{name}' {msg}"));
    let expand_all = |parts: Vec<JobSpec>| -> Result<Vec<JobSpec>> {
        parts.into_iter().map(expand_composite).collect()
    };

    let mut composed = match (pipe.is_empty(), concat.is_empty()) {
        (true, true) => {
            return Ok(JobSpec {
                name,
                command,
                modules,
                input_files,
                output_files,
                after,
                samples,
                done,
                pipe,
                concat,
            });
        }
        (false, false) => return Err(invalid(&name, "sets both `pipe` and `concat`")),
        _ if !command.trim().is_empty() => {
            return Err(invalid(&name, "sets `command` next to `pipe` or `concat`"));
        }
        (false, true) => pipe_jobs(&expand_all(pipe)?, name.clone()),
        (true, false) => concat_jobs(&expand_all(concat)?, name.clone()),
    };

    union(&mut composed.modules, &modules);
    union(&mut composed.input_files, &input_files);
    union(&mut composed.output_files, &output_files);
    union(&mut composed.after, &after);
    union(&mut composed.samples, &samples);
    composed.done = done;
    Ok(composed)
}

/// Expand every composite job of a definition in place.
pub fn expand_definition(mut def: PipelineFile) -> Result<PipelineFile> {
    for step in def.steps.iter_mut() {
        step.jobs = std::mem::take(&mut step.jobs)
            .into_iter()
            .map(expand_composite)
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(def)
}
