//! Subcommands of the `grocer` binary.

pub mod config;
pub mod import;
pub mod parse;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::debug;

use grocer_core::GrocerConfig;

/// Per-user configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("grocer")
        .join("config.json")
}

/// Load the explicit config file, else the per-user one if present, else defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<GrocerConfig> {
    if let Some(path) = path {
        debug!("Loading configuration from {}", path.display());
        return Ok(GrocerConfig::from_file(path)?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(GrocerConfig::from_file(&default_path)?)
    } else {
        Ok(GrocerConfig::default())
    }
}
