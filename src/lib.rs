// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod definition;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod resume;
pub mod sample;
pub mod scheduler;
pub mod types;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ClusterConfig, ConfigLookup, load_all};
use crate::dag::Pipeline;
use crate::definition::{BuildOptions, build_pipeline, load_definition};
use crate::fs::RealFileSystem;
use crate::scheduler::create_scheduler;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - cluster config loading (every `--config`, merged in order)
/// - pipeline definition loading and building
/// - up-to-date detection against the real filesystem
/// - rendering with the selected backend, written to stdout
pub fn run(args: CliArgs) -> Result<()> {
    let config: ClusterConfig = load_all(&args.config).context("loading cluster config")?;
    let config: Arc<dyn ConfigLookup> = Arc::new(config);

    let definition = load_definition(&args.pipeline)
        .with_context(|| format!("loading pipeline definition {}", args.pipeline))?;

    let options = BuildOptions {
        step_range: args.steps.clone(),
        force: args.force,
        output_dir: args.output_dir.clone(),
    };
    let pipeline = build_pipeline(definition, &options, &RealFileSystem)?;
    info!(
        pipeline = %pipeline.name(),
        jobs = pipeline.job_count(),
        scheduler = %args.job_scheduler,
        "pipeline built"
    );

    if args.dry_run {
        print_dry_run(&pipeline);
        return Ok(());
    }

    let scheduler = create_scheduler(args.job_scheduler, config);
    let rendered = scheduler.submit(&pipeline)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;

    debug!(bytes = rendered.len(), "rendering written to stdout");
    Ok(())
}

/// Simple dry-run output: steps, jobs and their dependencies, on stderr so
/// stdout stays empty.
fn print_dry_run(pipeline: &Pipeline) {
    eprintln!("pipesubmit dry-run");
    eprintln!("  pipeline = {} {}", pipeline.name(), pipeline.meta().version);
    eprintln!("  output_dir = {}", pipeline.output_dir());
    eprintln!();

    for step in pipeline.steps() {
        if step.is_skipped() {
            eprintln!("step {} (skipped)", step.name);
            continue;
        }
        eprintln!("step {} ({}):", step.name, scheduler::render::job_count(step.jobs.len()));
        for job in step.jobs.iter() {
            eprintln!("  - {} [{}]", job.name, job.id);
            if !job.dependencies.is_empty() {
                let deps: Vec<&str> = job.dependencies.iter().map(|d| d.as_str()).collect();
                eprintln!("      after: {}", deps.join(", "));
            }
            eprintln!("      done: {}", job.done);
        }
    }

    debug!("dry-run complete (nothing rendered)");
}
