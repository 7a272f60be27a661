// src/config/lookup.rs

//! Typed configuration lookups.
//!
//! Schedulers never read configuration from global state: they receive an
//! `Arc<dyn ConfigLookup>` when they are built, and resolve every per-family
//! key through it.

use std::fmt::Debug;
use std::path::PathBuf;

use crate::config::model::{ClusterConfig, DEFAULT_SECTION};
use crate::errors::{PipesubmitError, Result};

/// Declared type of a configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Boolean,
    PosInt,
    FilePath,
}

impl ParamType {
    fn expected(&self) -> &'static str {
        match self {
            ParamType::String => "a string",
            ParamType::Boolean => "a boolean",
            ParamType::PosInt => "a positive integer",
            ParamType::FilePath => "a non-empty file path",
        }
    }
}

/// A parameter value after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Boolean(bool),
    PosInt(u64),
    FilePath(PathBuf),
}

/// Capability to resolve `(section, key)` pairs.
///
/// Implementors only provide [`ConfigLookup::value`]; the typed accessors
/// apply the `[DEFAULT]` fallback result to the declared type and turn
/// absence into [`PipesubmitError::MissingParam`].
pub trait ConfigLookup: Send + Sync + Debug {
    /// Raw value of `key` in `section`, falling back to `[DEFAULT]`.
    fn value(&self, section: &str, key: &str) -> Option<&toml::Value>;

    /// Resolve and coerce; `Ok(None)` when the key is absent everywhere.
    fn param(&self, section: &str, key: &str, ty: ParamType) -> Result<Option<ParamValue>> {
        match self.value(section, key) {
            Some(value) => coerce(section, key, value, ty).map(Some),
            None => Ok(None),
        }
    }

    fn required(&self, section: &str, key: &str, ty: ParamType) -> Result<ParamValue> {
        self.param(section, key, ty)?
            .ok_or_else(|| PipesubmitError::MissingParam {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    fn string(&self, section: &str, key: &str) -> Result<String> {
        match self.required(section, key, ParamType::String)? {
            ParamValue::String(s) => Ok(s),
            other => unreachable_variant(section, key, other),
        }
    }

    fn boolean(&self, section: &str, key: &str) -> Result<bool> {
        match self.required(section, key, ParamType::Boolean)? {
            ParamValue::Boolean(b) => Ok(b),
            other => unreachable_variant(section, key, other),
        }
    }

    fn posint(&self, section: &str, key: &str) -> Result<u64> {
        match self.required(section, key, ParamType::PosInt)? {
            ParamValue::PosInt(n) => Ok(n),
            other => unreachable_variant(section, key, other),
        }
    }

    fn filepath(&self, section: &str, key: &str) -> Result<PathBuf> {
        match self.required(section, key, ParamType::FilePath)? {
            ParamValue::FilePath(p) => Ok(p),
            other => unreachable_variant(section, key, other),
        }
    }

    fn optional_posint(&self, section: &str, key: &str) -> Result<Option<u64>> {
        match self.param(section, key, ParamType::PosInt)? {
            Some(ParamValue::PosInt(n)) => Ok(Some(n)),
            Some(other) => unreachable_variant(section, key, other),
            None => Ok(None),
        }
    }
}

impl ConfigLookup for ClusterConfig {
    fn value(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.section(section)
            .and_then(|s| s.get(key))
            .or_else(|| self.section(DEFAULT_SECTION).and_then(|s| s.get(key)))
    }
}

fn unreachable_variant<T>(section: &str, key: &str, value: ParamValue) -> Result<T> {
    Err(PipesubmitError::ConfigError(format!(
        "[{section}] {key}: coercion produced unexpected {value:?}"
    )))
}

/// Coerce a raw TOML value to `ty`.
pub fn coerce(section: &str, key: &str, value: &toml::Value, ty: ParamType) -> Result<ParamValue> {
    let invalid = || PipesubmitError::InvalidParam {
        section: section.to_string(),
        key: key.to_string(),
        expected: ty.expected(),
        value: value.to_string(),
    };

    match ty {
        ParamType::String => scalar_string(value).map(ParamValue::String).ok_or_else(invalid),
        ParamType::Boolean => match value {
            toml::Value::Boolean(b) => Ok(ParamValue::Boolean(*b)),
            toml::Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ParamValue::Boolean(true)),
                "false" | "no" | "off" | "0" => Ok(ParamValue::Boolean(false)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        },
        ParamType::PosInt => {
            let n = match value {
                toml::Value::Integer(i) => *i,
                toml::Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
                _ => return Err(invalid()),
            };
            if n > 0 {
                Ok(ParamValue::PosInt(n as u64))
            } else {
                Err(invalid())
            }
        }
        ParamType::FilePath => match value {
            toml::Value::String(s) if !s.trim().is_empty() => {
                Ok(ParamValue::FilePath(PathBuf::from(s.trim())))
            }
            _ => Err(invalid()),
        },
    }
}

fn scalar_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;

    fn config(text: &str) -> ClusterConfig {
        let raw: RawConfigFile = toml::from_str(text).unwrap();
        ClusterConfig::try_from(raw).unwrap()
    }

    #[test]
    fn family_section_wins_over_default() {
        let cfg = config(
            r#"
[DEFAULT]
cluster_queue = "-q sw"
cluster_cpu = "-l nodes=1:ppn=1"

[bwa]
cluster_cpu = "-l nodes=1:ppn=12"
"#,
        );
        assert_eq!(cfg.string("bwa", "cluster_cpu").unwrap(), "-l nodes=1:ppn=12");
        assert_eq!(cfg.string("bwa", "cluster_queue").unwrap(), "-q sw");
        assert_eq!(cfg.string("unknown_family", "cluster_cpu").unwrap(), "-l nodes=1:ppn=1");
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let cfg = config("[DEFAULT]\ncluster_queue = \"-q sw\"\n");
        match cfg.string("bwa", "cluster_submit_cmd") {
            Err(PipesubmitError::MissingParam { section, key }) => {
                assert_eq!(section, "bwa");
                assert_eq!(key, "cluster_submit_cmd");
            }
            other => panic!("expected MissingParam, got {:?}", other),
        }
    }

    #[test]
    fn coerces_declared_types() {
        let cfg = config(
            r#"
[DEFAULT]
flag_a = "yes"
flag_b = false
n_str = "12"
n_int = 7
zero = 0
word = "twelve"
path = "/ref/genome.dict"
"#,
        );
        assert!(cfg.boolean("x", "flag_a").unwrap());
        assert!(!cfg.boolean("x", "flag_b").unwrap());
        assert_eq!(cfg.posint("x", "n_str").unwrap(), 12);
        assert_eq!(cfg.posint("x", "n_int").unwrap(), 7);
        assert_eq!(cfg.string("x", "n_int").unwrap(), "7");
        assert_eq!(cfg.filepath("x", "path").unwrap(), PathBuf::from("/ref/genome.dict"));
        assert_eq!(cfg.optional_posint("x", "absent").unwrap(), None);

        assert!(matches!(
            cfg.posint("x", "zero"),
            Err(PipesubmitError::InvalidParam { expected: "a positive integer", .. })
        ));
        assert!(matches!(cfg.posint("x", "word"), Err(PipesubmitError::InvalidParam { .. })));
        assert!(matches!(cfg.boolean("x", "word"), Err(PipesubmitError::InvalidParam { .. })));
    }
}
