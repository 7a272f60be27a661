// src/logging.rs

//! Diagnostics go to stderr so stdout stays a clean artifact: the PBS or
//! bash script, or the JSON trace, can be redirected straight to a file.
//!
//! The verbosity comes from `--log-level`, then `PIPESUBMIT_LOG`, then
//! falls back to `info`. An unreadable `PIPESUBMIT_LOG` is ignored.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "PIPESUBMIT_LOG";

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Install the process-wide stderr subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let level = effective_level(cli_level, env.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("cannot install log subscriber: {e}"))
}

/// Flag wins over the environment value; `info` when neither is usable.
pub fn effective_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_value.and_then(parse_env_level))
        .unwrap_or(Level::INFO)
}

/// `PIPESUBMIT_LOG` accepts level names in any case, plus `warning`.
fn parse_env_level(value: &str) -> Option<Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_level_strings() {
        assert_eq!(parse_env_level(" WARNING "), Some(Level::WARN));
        assert_eq!(parse_env_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_env_level("loud"), None);
    }

    #[test]
    fn flag_beats_environment() {
        assert_eq!(effective_level(Some(LogLevel::Error), Some("trace")), Level::ERROR);
        assert_eq!(effective_level(None, Some("trace")), Level::TRACE);
        assert_eq!(effective_level(None, Some("loud")), Level::INFO);
        assert_eq!(effective_level(None, None), Level::INFO);
    }
}
