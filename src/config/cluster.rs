// src/config/cluster.rs

use crate::config::lookup::ConfigLookup;
use crate::config::model::DEFAULT_SECTION;
use crate::errors::Result;

/// Cluster settings for one job family, resolved to literal values.
///
/// All of these are required (in the family section or `[DEFAULT]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOptions {
    pub submit_cmd: String,
    pub other_arg: String,
    pub work_dir_arg: String,
    pub output_dir_arg: String,
    pub job_name_arg: String,
    pub walltime: String,
    pub queue: String,
    pub cpu: String,
    /// Prefix the dependency list is appended to, e.g. `-W depend=afterok:`.
    pub dependency_arg: String,
    pub submit_cmd_suffix: String,
    /// Whether the submit command prints the queue's job id on stdout.
    pub produces_job_id: bool,
}

impl ClusterOptions {
    pub fn resolve(config: &dyn ConfigLookup, family: &str) -> Result<Self> {
        Ok(Self {
            submit_cmd: config.string(family, "cluster_submit_cmd")?,
            other_arg: config.string(family, "cluster_other_arg")?,
            work_dir_arg: config.string(family, "cluster_work_dir_arg")?,
            output_dir_arg: config.string(family, "cluster_output_dir_arg")?,
            job_name_arg: config.string(family, "cluster_job_name_arg")?,
            walltime: config.string(family, "cluster_walltime")?,
            queue: config.string(family, "cluster_queue")?,
            cpu: config.string(family, "cluster_cpu")?,
            dependency_arg: config.string(family, "cluster_dependency_arg")?,
            submit_cmd_suffix: config.string(family, "cluster_submit_cmd_suffix")?,
            produces_job_id: config.boolean(family, "cluster_cmd_produces_job_id")?,
        })
    }
}

/// Global job ceiling, read from `[DEFAULT]` only.
pub fn max_jobs(config: &dyn ConfigLookup) -> Result<Option<u64>> {
    config.optional_posint(DEFAULT_SECTION, "cluster_max_jobs")
}
