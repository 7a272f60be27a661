// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::SchedulerKind;

/// Command-line arguments for `pipesubmit`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipesubmit",
    version,
    about = "Compile a pipeline definition into a job submission script.",
    long_about = None
)]
pub struct CliArgs {
    /// Cluster configuration file(s) (TOML).
    ///
    /// May be repeated; keys in later files override earlier ones.
    #[arg(short = 'c', long = "config", value_name = "PATH", required = true)]
    pub config: Vec<String>,

    /// Pipeline definition file (TOML).
    #[arg(short = 'p', long, value_name = "PATH")]
    pub pipeline: String,

    /// Backend to render for.
    #[arg(short = 'j', long, value_enum, default_value_t = SchedulerKind::Pbs)]
    pub job_scheduler: SchedulerKind,

    /// Step range to render, e.g. "1-5", "3,6,7", "10-".
    ///
    /// Default: every step of the definition.
    #[arg(short = 's', long, value_name = "RANGE")]
    pub steps: Option<String>,

    /// Render every job, even those whose done files are up to date.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Override the `[pipeline].output_dir` of the definition.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPESUBMIT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Build and validate the pipeline, print a summary to stderr, render nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
