//! Configuration for tillsync
//!
//! Configuration is loaded from an optional YAML file and overlaid with
//! `TILLSYNC_*` environment variables. Validation happens before any sync
//! attempt; missing credentials are a fatal startup error.

use crate::endpoints::EndpointTable;
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source API connection settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Sink store settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// Pacing and batching knobs
    #[serde(default)]
    pub sync: SyncTuning,

    /// Optional endpoint-table override; the built-in table is used when
    /// absent
    #[serde(default)]
    pub endpoints: Option<EndpointTable>,
}

impl AppConfig {
    /// Load configuration: YAML file (when given), then env overlay, then
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Overlay `TILLSYNC_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Overlay from an arbitrary variable lookup. Empty values count as
    /// unset.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let fetch = |name: &str| get(name).none_if_empty();

        if let Some(url) = fetch("TILLSYNC_SOURCE_URL") {
            self.source.base_url = url;
        }
        if let Some(username) = fetch("TILLSYNC_SOURCE_USERNAME") {
            self.source.username = username;
        }
        if let Some(api_key) = fetch("TILLSYNC_SOURCE_API_KEY") {
            self.source.api_key = api_key;
        }
        if let Some(db_path) = fetch("TILLSYNC_DB_PATH") {
            self.sink.db_path = PathBuf::from(db_path);
        }
    }

    /// Reject configurations that cannot possibly sync. Runs before any
    /// network or sink activity.
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.is_empty() {
            return Err(Error::missing_field("source.base_url"));
        }
        if url::Url::parse(&self.source.base_url).is_err() {
            return Err(Error::invalid_value(
                "source.base_url",
                format!("not a valid URL: {}", self.source.base_url),
            ));
        }
        if self.source.username.is_empty() {
            return Err(Error::missing_field("source.username"));
        }
        if self.source.api_key.is_empty() {
            return Err(Error::missing_field("source.api_key"));
        }
        if self.sync.page_size == 0 {
            return Err(Error::invalid_value("sync.page_size", "must be at least 1"));
        }
        if self.sync.chunk_size == 0 {
            return Err(Error::invalid_value(
                "sync.chunk_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// The endpoint table to resolve candidates from
    pub fn endpoint_table(&self) -> EndpointTable {
        self.endpoints.clone().unwrap_or_default()
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Source API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the source API
    #[serde(default)]
    pub base_url: String,

    /// Basic-auth username
    #[serde(default)]
    pub username: String,

    /// Basic-auth API key (the password half of the pair)
    #[serde(default)]
    pub api_key: String,

    /// User-Agent header sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl SourceConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            api_key: String::new(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("tillsync/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> u64 {
    30
}

// ============================================================================
// Sink Config
// ============================================================================

/// Sink store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Path of the DuckDB database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tillsync.duckdb")
}

// ============================================================================
// Sync Tuning
// ============================================================================

/// Pacing and batching knobs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncTuning {
    /// Minimum spacing between source API calls in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Extra pause between days of a range sync in milliseconds
    #[serde(default = "default_day_pace_ms")]
    pub day_pace_ms: u64,

    /// Requested page size (the `rows` query parameter)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Rows per upsert chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl SyncTuning {
    /// Minimum inter-call spacing as a Duration
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Inter-day pacing as a Duration
    pub fn day_pace(&self) -> Duration {
        Duration::from_millis(self.day_pace_ms)
    }
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            day_pace_ms: default_day_pace_ms(),
            page_size: default_page_size(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    500
}

fn default_day_pace_ms() -> u64 {
    2000
}

fn default_page_size() -> usize {
    200
}

fn default_chunk_size() -> usize {
    100
}
