use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

use crate::errors::PipesubmitError;

/// Execution backend a pipeline is rendered for.
///
/// - `Pbs`: one queue submission per job, dependencies passed to the queue.
/// - `Batch`: a plain bash script running every job in order on this host.
/// - `Daemon`: a JSON snapshot of the whole graph for monitoring tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[value(alias = "cluster")]
    Pbs,
    #[value(alias = "sequential")]
    Batch,
    #[value(alias = "trace")]
    Daemon,
}

impl Default for SchedulerKind {
    fn default() -> Self {
        SchedulerKind::Pbs
    }
}

impl FromStr for SchedulerKind {
    type Err = PipesubmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pbs" | "cluster" => Ok(SchedulerKind::Pbs),
            "batch" | "sequential" => Ok(SchedulerKind::Batch),
            "daemon" | "trace" => Ok(SchedulerKind::Daemon),
            other => Err(PipesubmitError::UnknownScheduler(other.to_string())),
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerKind::Pbs => "pbs",
            SchedulerKind::Batch => "batch",
            SchedulerKind::Daemon => "daemon",
        };
        f.write_str(name)
    }
}

/// Sequencing layout of a readset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RunType {
    #[serde(rename = "PAIRED_END")]
    PairedEnd,
    #[serde(rename = "SINGLE_END")]
    SingleEnd,
}

impl RunType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunType::PairedEnd => "PAIRED_END",
            RunType::SingleEnd => "SINGLE_END",
        }
    }
}
