// src/definition/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::definition::model::PipelineFile;
use crate::errors::Result;

/// Read a pipeline definition without validating it.
pub fn load_definition(path: impl AsRef<Path>) -> Result<PipelineFile> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading pipeline definition");
    let contents = fs::read_to_string(path)?;
    let def: PipelineFile = toml::from_str(&contents)?;
    Ok(def)
}
