// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vidcast configuration system.

use vidcast_config::diagnostic::ConfigError;
use vidcast_config::model::VidcastConfig;
use vidcast_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_vidcast_config() {
    let toml = r#"
[log]
level = "debug"

[storage]
database_path = "/tmp/vidcast-test.db"
wal_mode = false

[http]
timeout_secs = 30
user_agent = "vidcast-test"

[platforms.youtube]
api_base = "http://127.0.0.1:8080/youtube/v3"
upload_base = "http://127.0.0.1:8080/upload/youtube/v3"

[platforms.snapchat]
api_base = "http://127.0.0.1:8081"

[worker]
sweep_interval_secs = 10
batch_size = 50
concurrency = 8
publish_timeout_secs = 300
default_max_retries = 5

[metrics]
enabled = true
listen = "0.0.0.0:9100"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/vidcast-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.http.user_agent, "vidcast-test");
    assert_eq!(
        config.platforms.youtube.upload_base.as_deref(),
        Some("http://127.0.0.1:8080/upload/youtube/v3")
    );
    assert_eq!(
        config.platforms.snapchat.api_base.as_deref(),
        Some("http://127.0.0.1:8081")
    );
    assert!(config.platforms.tiktok.api_base.is_none());
    assert_eq!(config.worker.sweep_interval_secs, 10);
    assert_eq!(config.worker.batch_size, 50);
    assert_eq!(config.worker.concurrency, 8);
    assert_eq!(config.worker.publish_timeout_secs, 300);
    assert_eq!(config.worker.default_max_retries, 5);
    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.listen, "0.0.0.0:9100");
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    let defaults = VidcastConfig::default();
    assert_eq!(config.log.level, "info");
    assert_eq!(config.worker.batch_size, defaults.worker.batch_size);
    assert_eq!(config.worker.default_max_retries, 3);
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("vidcast.db"));
    assert!(!config.metrics.enabled);
    assert_eq!(config.metrics.listen, "127.0.0.1:9464");
}

#[test]
fn unknown_field_in_worker_produces_suggestion() {
    let toml = r#"
[worker]
bacth_size = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let has_suggestion = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "bacth_size"
                && suggestion.as_deref() == Some("batch_size")
                && valid_keys.contains("concurrency")
        })
    });
    assert!(
        has_suggestion,
        "should suggest `batch_size` for `bacth_size`, got: {errors:?}"
    );
}

#[test]
fn unknown_platform_table_is_rejected() {
    let toml = r#"
[platforms.linkedin]
api_base = "https://api.linkedin.com"
"#;

    let errors = load_and_validate_str(toml).expect_err("linkedin is not a platform");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "linkedin")),
        "got: {errors:?}"
    );
}

#[test]
fn credentials_are_not_accepted_in_config() {
    let toml = r#"
[platforms.youtube]
access_token = "ya29.secret"
"#;

    let errors = load_and_validate_str(toml).expect_err("tokens belong to workspaces");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "access_token")),
        "got: {errors:?}"
    );
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[worker]
concurrency = "lots"
"#;

    let errors = load_and_validate_str(toml).expect_err("string is not a number");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "expected InvalidType, got: {errors:?}"
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[log]
level = "verbose"

[worker]
batch_size = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn unknown_key_renders_with_help() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "levle".to_string(),
        suggestion: Some("level".to_string()),
        valid_keys: "level".to_string(),
        span: None,
        src: None,
    };

    let mut out = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut out, &error)
        .expect("render should succeed");
    assert!(out.contains("levle"));
    assert!(out.contains("did you mean `level`?"));
}
