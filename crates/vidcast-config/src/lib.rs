// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Vidcast worker and command line.
//!
//! `vidcast.toml` is layered over compiled defaults and `VIDCAST_*`
//! environment overrides, then checked with `deny_unknown_fields` and the
//! semantic rules in [`validation`]. Failures come back as miette
//! diagnostics pointing into the TOML that caused them.
//!
//! ```no_run
//! let config = vidcast_config::load_and_validate().expect("config errors");
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::VidcastConfig;

/// Validate a successful load, or turn the figment failure into diagnostics
/// against `sources`, which are only read when something went wrong.
fn finish(
    loaded: Result<VidcastConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<VidcastConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load from the XDG hierarchy plus environment and validate.
pub fn load_and_validate() -> Result<VidcastConfig, Vec<ConfigError>> {
    finish(loader::load_config(), || {
        loader::search_paths()
            .into_iter()
            .filter_map(read_source)
            .collect()
    })
}

/// Load from an explicit file plus environment and validate.
pub fn load_and_validate_path(path: &Path) -> Result<VidcastConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_source(path.to_path_buf()).into_iter().collect()
    })
}

/// Load from a TOML string and validate. Used by tests.
pub fn load_and_validate_str(toml_content: &str) -> Result<VidcastConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Read a config file for span lookup. Relative paths are made absolute so
/// they compare equal to the paths figment records.
fn read_source(path: PathBuf) -> Option<(String, String)> {
    let content = std::fs::read_to_string(&path).ok()?;
    let path = if path.is_relative() {
        std::env::current_dir().map(|d| d.join(&path)).unwrap_or(path)
    } else {
        path
    };
    Some((path.display().to_string(), content))
}
