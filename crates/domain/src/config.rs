//! Application configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_TIMEOUT, DEFAULT_DB_POOL_SIZE, DEFAULT_MAX_PER_RUN};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Partner API access.
    pub provider: ProviderConfig,
    /// Approvals database.
    pub database: DatabaseConfig,
    /// Per-run budget.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// France Travail partner API credentials and endpoints
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the partner API, e.g. `https://api.francetravail.io/partenaire`.
    pub base_url: String,
    /// Base URL of the OAuth server, e.g. `https://entreprise.francetravail.fr`.
    pub auth_base_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Timeout of every provider call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// [`Self::timeout_secs`] as a duration.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// SQLite database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path.
    pub path: String,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Scheduler budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Attempts shared by all kinds in one run.
    #[serde(default = "default_max_per_run")]
    pub max_per_run: usize,
    /// Attempts allowed per kind; defaults to the whole budget.
    #[serde(default)]
    pub per_kind_limit: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_per_run: DEFAULT_MAX_PER_RUN, per_kind_limit: None }
    }
}

impl BatchConfig {
    /// Effective per-kind limit, never above `max_per_run`.
    pub fn per_kind_limit(&self) -> usize {
        self.per_kind_limit.unwrap_or(self.max_per_run).min(self.max_per_run)
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT.as_secs()
}

const fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

const fn default_max_per_run() -> usize {
    DEFAULT_MAX_PER_RUN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_defaults() {
        let config: Config = toml::from_str(
            r#"
            [provider]
            base_url = "https://api.example.test/partenaire"
            auth_base_url = "https://auth.example.test"
            client_id = "id"
            client_secret = "secret"

            [database]
            path = "passiae.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.timeout_secs, 60);
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.batch.max_per_run, 100);
        assert_eq!(config.batch.per_kind_limit(), 100);
    }

    #[test]
    fn test_per_kind_limit_never_exceeds_budget() {
        let batch = BatchConfig { max_per_run: 10, per_kind_limit: Some(50) };
        assert_eq!(batch.per_kind_limit(), 10);
        let batch = BatchConfig { max_per_run: 10, per_kind_limit: Some(3) };
        assert_eq!(batch.per_kind_limit(), 3);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let provider = ProviderConfig {
            base_url: "b".into(),
            auth_base_url: "a".into(),
            client_id: "id".into(),
            client_secret: "hunter2".into(),
            timeout_secs: 60,
        };
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
