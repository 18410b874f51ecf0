//! Configuration structures for importing and reporting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GrocerError, Result};

/// Main configuration for grocer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrocerConfig {
    /// Staging and archive locations.
    pub paths: PathsConfig,

    /// Line parser configuration.
    pub parser: ParserConfig,

    /// Keyword report configuration.
    pub report: ReportConfig,
}

/// Directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Staging directory holding `<name>.txt` and `<name>.pdf` pairs.
    pub inbox: PathBuf,

    /// Root of the date-partitioned archive.
    pub database: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inbox: PathBuf::from("Inbox"),
            database: PathBuf::from("Database"),
        }
    }
}

impl PathsConfig {
    /// Create both directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.inbox, &self.database] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Line parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Lines starting with any of these are OCR tool annotations and are dropped.
    pub metadata_prefixes: Vec<String>,

    /// Strip a trailing taxable marker (`T`, or ` 7` as misread by OCR).
    pub strip_tax_markers: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            // gImageReader writes "[File: ...]" headers into its output
            metadata_prefixes: vec!["[File".to_string()],
            strip_tax_markers: true,
        }
    }
}

/// Keyword report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of keywords to show.
    pub top_n: usize,

    /// Seed for example sampling. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_n: 10, seed: None }
    }
}

impl GrocerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| GrocerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| GrocerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "report": { "top_n": 3 } }"#).unwrap();

        let config = GrocerConfig::from_file(&path).unwrap();
        assert_eq!(config.report.top_n, 3);
        assert_eq!(config.report.seed, None);
        assert_eq!(config.paths.inbox, PathBuf::from("Inbox"));
        assert_eq!(config.parser.metadata_prefixes, vec!["[File".to_string()]);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = GrocerConfig::default();
        config.paths.database = PathBuf::from("/srv/receipts");
        config.report.seed = Some(7);
        config.save(&path).unwrap();

        let loaded = GrocerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.paths.database, PathBuf::from("/srv/receipts"));
        assert_eq!(loaded.report.seed, Some(7));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            GrocerConfig::from_file(&path),
            Err(GrocerError::Config(_))
        ));
    }

    #[test]
    fn test_ensure_dirs_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            inbox: dir.path().join("Inbox"),
            database: dir.path().join("Database"),
        };
        paths.ensure_dirs().unwrap();
        assert!(paths.inbox.is_dir());
        assert!(paths.database.is_dir());
    }
}
