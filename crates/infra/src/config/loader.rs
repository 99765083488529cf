//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. `PASSIAE_CONFIG`, when set, names the config file to use
//! 2. Otherwise, attempts to load from environment variables
//! 3. If incomplete, falls back to loading from a probed file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PASSIAE_PE_BASE_URL`: Partner API base URL
//! - `PASSIAE_PE_AUTH_BASE_URL`: OAuth server base URL
//! - `PASSIAE_PE_CLIENT_ID`: OAuth client id
//! - `PASSIAE_PE_CLIENT_SECRET`: OAuth client secret
//! - `PASSIAE_PE_TIMEOUT_SECS`: Request timeout in seconds (optional, 60)
//! - `PASSIAE_DB_PATH`: Database file path
//! - `PASSIAE_DB_POOL_SIZE`: Connection pool size (optional, 4)
//! - `PASSIAE_BATCH_MAX_PER_RUN`: Notification attempts per run (optional,
//!   100)
//! - `PASSIAE_BATCH_PER_KIND_LIMIT`: Attempts per approval kind (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./passiae.toml` or `./passiae.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use passiae_domain::constants::{DEFAULT_API_TIMEOUT, DEFAULT_DB_POOL_SIZE, DEFAULT_MAX_PER_RUN};
use passiae_domain::{
    BatchConfig, Config, DatabaseConfig, PassIaeError, ProviderConfig, Result,
};

/// Variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "PASSIAE_CONFIG";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `PassIaeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return load_from_file(Some(PathBuf::from(path)));
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PassIaeError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let provider = ProviderConfig {
        base_url: env_var("PASSIAE_PE_BASE_URL")?,
        auth_base_url: env_var("PASSIAE_PE_AUTH_BASE_URL")?,
        client_id: env_var("PASSIAE_PE_CLIENT_ID")?,
        client_secret: env_var("PASSIAE_PE_CLIENT_SECRET")?,
        timeout_secs: env_parse("PASSIAE_PE_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_API_TIMEOUT.as_secs()),
    };

    let database = DatabaseConfig {
        path: env_var("PASSIAE_DB_PATH")?,
        pool_size: env_parse("PASSIAE_DB_POOL_SIZE")?.unwrap_or(DEFAULT_DB_POOL_SIZE),
    };

    let batch = BatchConfig {
        max_per_run: env_parse("PASSIAE_BATCH_MAX_PER_RUN")?.unwrap_or(DEFAULT_MAX_PER_RUN),
        per_kind_limit: env_parse("PASSIAE_BATCH_PER_KIND_LIMIT")?,
    };

    Ok(Config { provider, database, batch })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `PassIaeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PassIaeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PassIaeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PassIaeError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PassIaeError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PassIaeError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PassIaeError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.toml"),
        dir.join("config.json"),
        dir.join("passiae.toml"),
        dir.join("passiae.json"),
        dir.join("../config.toml"),
        dir.join("../config.json"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PassIaeError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PassIaeError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
