//! Logging setup
//!
//! Installs a global `tracing` subscriber filtered by `RUST_LOG` (default
//! `info`). Output is human-readable unless `PASSIAE_LOG_FORMAT=json`.

use passiae_domain::{PassIaeError, Result};
use tracing_subscriber::EnvFilter;

/// Variable selecting the log output format.
pub const LOG_FORMAT_VAR: &str = "PASSIAE_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Format named by `PASSIAE_LOG_FORMAT`, text when unset or unknown.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_VAR).map(|raw| Self::parse(&raw)).unwrap_or_default()
    }

    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `PassIaeError::Config` for an unparsable `RUST_LOG` and
/// `PassIaeError::Internal` when a subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER)
            .map_err(|e| PassIaeError::Config(format!("Invalid log filter: {e}")))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false);
    let installed = match format {
        LogFormat::Text => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| PassIaeError::Internal(format!("tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init_tracing(LogFormat::Text);
        assert!(matches!(init_tracing(LogFormat::Json), Err(PassIaeError::Internal(_))));
    }
}
