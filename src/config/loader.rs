// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{ClusterConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a single configuration file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ClusterConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ClusterConfig::try_from(raw_config)?;
    Ok(config)
}

/// Load several configuration files, overlaying them in order, then validate
/// the merged result.
///
/// A key set in a later file replaces the same key of the same section in an
/// earlier one; everything else is kept.
pub fn load_all<I, P>(paths: I) -> Result<ClusterConfig>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut merged = RawConfigFile::default();
    for path in paths {
        debug!(path = %path.as_ref().display(), "loading cluster config");
        merged = merged.merge(load_from_path(&path)?);
    }
    ClusterConfig::try_from(merged)
}
