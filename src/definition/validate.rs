// src/definition/validate.rs

use std::collections::HashSet;

use crate::dag::JobGraph;
use crate::definition::model::PipelineFile;
use crate::errors::{PipesubmitError, Result};

/// Check a definition before any job is resolved.
///
/// Order matters only for which error is reported first.
pub fn validate_definition(def: &PipelineFile) -> Result<()> {
    validate_pipeline_section(def)?;
    validate_names(def)?;
    validate_references(def)?;
    validate_dag(def)?;
    Ok(())
}

fn invalid(msg: String) -> PipesubmitError {
    PipesubmitError::InvalidPipeline(msg)
}

fn validate_pipeline_section(def: &PipelineFile) -> Result<()> {
    if def.pipeline.name.trim().is_empty() {
        return Err(invalid("[pipeline].name must not be empty".to_string()));
    }
    if def.pipeline.output_dir.trim().is_empty() {
        return Err(invalid("[pipeline].output_dir must not be empty".to_string()));
    }
    Ok(())
}

fn validate_names(def: &PipelineFile) -> Result<()> {
    let mut steps = HashSet::new();
    let mut jobs = HashSet::new();
    for step in def.steps.iter() {
        if !steps.insert(step.name.as_str()) {
            return Err(invalid(format!("step '{}' is defined twice", step.name)));
        }
        for job in step.jobs.iter() {
            if job.name.trim().is_empty() {
                return Err(invalid(format!("step '{}' has a job without a name", step.name)));
            }
            if job.command.trim().is_empty() {
                return Err(invalid(format!("job '{}' has no command", job.name)));
            }
            if !jobs.insert(job.name.as_str()) {
                return Err(invalid(format!("job '{}' is defined twice", job.name)));
            }
        }
    }
    Ok(())
}

fn validate_references(def: &PipelineFile) -> Result<()> {
    let samples: HashSet<&str> = def.samples.iter().map(|s| s.name.as_str()).collect();
    let jobs: HashSet<&str> = def
        .steps
        .iter()
        .flat_map(|s| s.jobs.iter())
        .map(|j| j.name.as_str())
        .collect();

    for readset in def.readsets.iter() {
        if !samples.contains(readset.sample.as_str()) {
            return Err(invalid(format!(
                "readset '{}' belongs to unknown sample '{}'",
                readset.name, readset.sample
            )));
        }
    }

    for job in def.steps.iter().flat_map(|s| s.jobs.iter()) {
        for dep in job.after.iter() {
            if dep == &job.name {
                return Err(invalid(format!(
                    "job '{}' cannot depend on itself in `after`",
                    job.name
                )));
            }
            if !jobs.contains(dep.as_str()) {
                return Err(PipesubmitError::JobNotFound(format!(
                    "job '{}' has unknown dependency '{}' in `after`",
                    job.name, dep
                )));
            }
        }
        for sample in job.samples.iter() {
            if !samples.contains(sample.as_str()) {
                return Err(invalid(format!(
                    "job '{}' references unknown sample '{}'",
                    job.name, sample
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(def: &PipelineFile) -> Result<()> {
    let mut graph = JobGraph::new();
    for job in def.steps.iter().flat_map(|s| s.jobs.iter()) {
        graph.add_job(&job.name);
    }
    for job in def.steps.iter().flat_map(|s| s.jobs.iter()) {
        for dep in job.after.iter() {
            graph.add_dependency(dep, &job.name);
        }
    }
    graph.topological_order().map(|_| ())
}
