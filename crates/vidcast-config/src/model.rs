// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Vidcast.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Platform credentials never live here; they belong
//! to workspaces.

use serde::{Deserialize, Serialize};

/// Top-level Vidcast configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VidcastConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound HTTP settings shared by all platform clients.
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-platform endpoint overrides.
    #[serde(default)]
    pub platforms: PlatformsConfig,

    /// Background job runner settings.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vidcast").join("vidcast.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vidcast.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. Uploads of large files may need more.
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent to every platform.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    120
}

fn default_user_agent() -> String {
    format!("vidcast/{}", env!("CARGO_PKG_VERSION"))
}

/// Endpoint overrides, one table per platform.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformsConfig {
    #[serde(default)]
    pub youtube: EndpointConfig,
    #[serde(default)]
    pub tiktok: EndpointConfig,
    #[serde(default)]
    pub instagram: EndpointConfig,
    #[serde(default)]
    pub facebook: EndpointConfig,
    #[serde(default)]
    pub twitter: EndpointConfig,
    #[serde(default)]
    pub snapchat: EndpointConfig,
}

impl PlatformsConfig {
    /// All endpoint tables paired with their section name.
    pub fn entries(&self) -> [(&'static str, &EndpointConfig); 6] {
        [
            ("youtube", &self.youtube),
            ("tiktok", &self.tiktok),
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
            ("twitter", &self.twitter),
            ("snapchat", &self.snapchat),
        ]
    }
}

/// Base URL overrides for one platform. `None` keeps the built-in endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// REST API base URL.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Media upload base URL, for platforms with a separate upload host.
    #[serde(default)]
    pub upload_base: Option<String>,
}

/// Job runner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Seconds between sweeps for due and pending jobs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Maximum jobs picked up per sweep, for each of the due and pending sets.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Jobs executed concurrently within one sweep.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout covering one whole publish (all four steps).
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,

    /// Retry bound for jobs created through the CLI without an explicit one.
    #[serde(default = "default_max_retries")]
    pub default_max_retries: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            publish_timeout_secs: default_publish_timeout_secs(),
            default_max_retries: default_max_retries(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    30
}

fn default_batch_size() -> u32 {
    25
}

fn default_concurrency() -> usize {
    4
}

fn default_publish_timeout_secs() -> u64 {
    900
}

fn default_max_retries() -> u32 {
    3
}

/// Prometheus metrics exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Serve job counters on `listen` while the worker runs.
    #[serde(default)]
    pub enabled: bool,

    /// Socket address of the scrape endpoint.
    #[serde(default = "default_metrics_listen")]
    pub listen: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_metrics_listen(),
        }
    }
}

fn default_metrics_listen() -> String {
    "127.0.0.1:9464".to_string()
}
