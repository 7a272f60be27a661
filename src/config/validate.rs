// src/config/validate.rs

use crate::config::lookup::{ParamType, coerce};
use crate::config::model::{ClusterConfig, DEFAULT_SECTION, RawConfigFile};
use crate::errors::{PipesubmitError, Result};

impl TryFrom<RawConfigFile> for ClusterConfig {
    type Error = crate::errors::PipesubmitError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ClusterConfig::new_unchecked(raw.sections))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_scalar_values(cfg)?;
    validate_global_config(cfg)?;
    Ok(())
}

fn validate_scalar_values(cfg: &RawConfigFile) -> Result<()> {
    for (section, values) in cfg.sections.iter() {
        for (key, value) in values.iter() {
            if matches!(
                value,
                toml::Value::Table(_) | toml::Value::Array(_) | toml::Value::Datetime(_)
            ) {
                return Err(PipesubmitError::ConfigError(format!(
                    "[{}].{} must be a string, number or boolean",
                    section, key
                )));
            }
        }
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    // cluster_max_jobs is only ever read from [DEFAULT]; a bad value there
    // should fail at load time, not after the script is half rendered.
    if let Some(value) = cfg
        .sections
        .get(DEFAULT_SECTION)
        .and_then(|s| s.get("cluster_max_jobs"))
    {
        coerce(DEFAULT_SECTION, "cluster_max_jobs", value, ParamType::PosInt)?;
    }
    Ok(())
}
