// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vidcast.toml` > `~/.config/vidcast/vidcast.toml` > `/etc/vidcast/vidcast.toml`
//! with environment variable overrides via `VIDCAST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VidcastConfig;

/// Top-level sections, used to turn `VIDCAST_SECTION_KEY` into `section.key`.
const SECTIONS: &[&str] = &["log", "storage", "http", "worker", "metrics"];

/// Platform tables nested under `[platforms]`.
const PLATFORM_SECTIONS: &[&str] = &[
    "youtube",
    "tiktok",
    "instagram",
    "facebook",
    "twitter",
    "snapchat",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vidcast/vidcast.toml` (system-wide)
/// 3. `~/.config/vidcast/vidcast.toml` (user XDG config)
/// 4. `./vidcast.toml` (local directory)
/// 5. `VIDCAST_*` environment variables
pub fn load_config() -> Result<VidcastConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<VidcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VidcastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VidcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VidcastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files in merge order, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/vidcast/vidcast.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("vidcast/vidcast.toml"));
    }
    paths.push(PathBuf::from("vidcast.toml"));
    paths
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(VidcastConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `VIDCAST_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, and `VIDCAST_PLATFORMS_YOUTUBE_API_BASE` to
/// `platforms.youtube.api_base`.
fn env_provider() -> Env {
    Env::prefixed("VIDCAST_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    if let Some(rest) = key.strip_prefix("platforms_") {
        for platform in PLATFORM_SECTIONS {
            if let Some(field) = rest.strip_prefix(platform).and_then(|r| r.strip_prefix('_')) {
                return format!("platforms.{platform}.{field}");
            }
        }
        return key.to_string();
    }
    for section in SECTIONS {
        if let Some(field) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}
