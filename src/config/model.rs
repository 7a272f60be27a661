// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Name of the fallback section every lookup consults last.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// One section: key -> scalar value.
pub type Section = BTreeMap<String, toml::Value>;

/// Cluster configuration as read from a TOML file, before validation.
///
/// Every top-level table is a section. The section name is either
/// `DEFAULT` or a job family (the job name up to its first `.`):
///
/// ```toml
/// [DEFAULT]
/// cluster_submit_cmd = "qsub"
/// cluster_walltime = "-l walltime=24:00:00"
/// cluster_cmd_produces_job_id = true
/// cluster_max_jobs = 3000
///
/// [trimmomatic]
/// cluster_cpu = "-l nodes=1:ppn=6"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawConfigFile {
    pub sections: BTreeMap<String, Section>,
}

/// Validated cluster configuration.
///
/// Construct it through `ClusterConfig::try_from(RawConfigFile)` (see
/// `validate.rs`) or one of the loaders.
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    sections: BTreeMap<String, Section>,
}

impl ClusterConfig {
    pub(crate) fn new_unchecked(sections: BTreeMap<String, Section>) -> Self {
        Self { sections }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|s| s.as_str())
    }
}

impl RawConfigFile {
    /// Overlay `other` on top of `self`, key by key.
    pub fn merge(mut self, other: RawConfigFile) -> RawConfigFile {
        for (name, section) in other.sections {
            let target = self.sections.entry(name).or_default();
            for (key, value) in section {
                target.insert(key, value);
            }
        }
        self
    }
}
