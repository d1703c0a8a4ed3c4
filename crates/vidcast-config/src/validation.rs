// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::VidcastConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of stopping at the first.
pub fn validate_config(config: &VidcastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        fail(format!(
            "log.level `{}` must be one of: {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.http.timeout_secs == 0 {
        fail("http.timeout_secs must be greater than 0".to_string());
    }

    if config.http.user_agent.trim().is_empty() {
        fail("http.user_agent must not be empty".to_string());
    }

    for (name, endpoint) in config.platforms.entries() {
        for (field, value) in [
            ("api_base", &endpoint.api_base),
            ("upload_base", &endpoint.upload_base),
        ] {
            if let Some(url) = value
                && !(url.starts_with("http://") || url.starts_with("https://"))
            {
                fail(format!(
                    "platforms.{name}.{field} `{url}` must start with http:// or https://"
                ));
            }
        }
    }

    let worker = &config.worker;
    if worker.sweep_interval_secs == 0 {
        fail("worker.sweep_interval_secs must be greater than 0".to_string());
    }
    if worker.batch_size == 0 {
        fail("worker.batch_size must be greater than 0".to_string());
    }
    if worker.concurrency == 0 {
        fail("worker.concurrency must be greater than 0".to_string());
    }
    if worker.publish_timeout_secs == 0 {
        fail("worker.publish_timeout_secs must be greater than 0".to_string());
    }
    if worker.default_max_retries == 0 {
        fail("worker.default_max_retries must be at least 1".to_string());
    }

    if config.metrics.listen.parse::<std::net::SocketAddr>().is_err() {
        fail(format!(
            "metrics.listen `{}` must be a socket address such as 127.0.0.1:9464",
            config.metrics.listen
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
