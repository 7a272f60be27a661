// src/sample.rs

//! Sample and readset metadata carried by a pipeline.
//!
//! The core only needs names from these (and the full readset record for the
//! trace document); parsing readset sheets is up to whoever builds the
//! pipeline.

use serde::Deserialize;

use crate::types::RunType;

/// A biological sample; owns nothing but its name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sample {
    pub name: String,
}

impl Sample {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// File name of the per-sample metadata document written by job2json.
    pub fn json_file(&self) -> String {
        format!("{}.json", self.name)
    }
}

/// One sequencing readset belonging to a sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Readset {
    pub name: String,
    /// Name of the owning sample.
    pub sample: String,
    #[serde(default)]
    pub library: Option<String>,
    pub run_type: RunType,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub lane: Option<String>,
    #[serde(default)]
    pub adapter1: Option<String>,
    #[serde(default)]
    pub adapter2: Option<String>,
    #[serde(default)]
    pub quality_offset: Option<u32>,
    #[serde(default)]
    pub beds: Vec<String>,
    #[serde(default)]
    pub fastq1: Option<String>,
    #[serde(default)]
    pub fastq2: Option<String>,
    #[serde(default)]
    pub bam: Option<String>,
}

impl Readset {
    pub fn new(name: impl Into<String>, sample: impl Into<String>, run_type: RunType) -> Self {
        Self {
            name: name.into(),
            sample: sample.into(),
            library: None,
            run_type,
            run: None,
            lane: None,
            adapter1: None,
            adapter2: None,
            quality_offset: None,
            beds: Vec::new(),
            fastq1: None,
            fastq2: None,
            bam: None,
        }
    }
}
