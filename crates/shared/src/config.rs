//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Outbox dispatcher configuration.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Outbox dispatcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Maximum events fetched per dispatch batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Seconds between dispatch polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Maximum automatic delivery attempts before an event is left
    /// terminally failed for operator triage.
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    /// Base delay for exponential backoff, in seconds.
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,
    /// Cap for exponential backoff, in seconds.
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            poll_interval_secs: default_poll_interval(),
            max_retries: default_max_retries(),
            backoff_base_secs: default_backoff_base(),
            backoff_cap_secs: default_backoff_cap(),
        }
    }
}

fn default_batch_size() -> u64 {
    50
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_retries() -> i32 {
    8
}

fn default_backoff_base() -> u64 {
    30
}

fn default_backoff_cap() -> u64 {
    3600 // 1 hour
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ATRIUM").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
