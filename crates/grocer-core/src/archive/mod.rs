//! Date-partitioned receipt archive.
//!
//! Layout: `<root>/<YYYY>/<MM>/<DD>/<id>.{txt,tsv,pdf}`. The three files of
//! a receipt always share the same identifier stem.

mod record;

pub use record::{
    read_records, write_records, RecordReader, RecordWriter, FIELD_DELIMITER,
};

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ArchiveError;

/// Extension of the raw OCR text.
pub const TEXT_EXTENSION: &str = "txt";
/// Extension of the structured record.
pub const RECORD_EXTENSION: &str = "tsv";
/// Extension of the scanned source document.
pub const SOURCE_EXTENSION: &str = "pdf";

/// Paths of one archived receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPaths {
    pub directory: PathBuf,
    pub text: PathBuf,
    pub record: PathBuf,
    pub source: PathBuf,
}

/// Maps dates and identifiers to locations under the archive root.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for receipts filed on `date`.
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format("%Y/%m/%d").to_string())
    }

    pub fn receipt_paths(&self, date: NaiveDate, id: &str) -> ReceiptPaths {
        let directory = self.day_dir(date);
        ReceiptPaths {
            text: directory.join(format!("{}.{}", id, TEXT_EXTENSION)),
            record: directory.join(format!("{}.{}", id, RECORD_EXTENSION)),
            source: directory.join(format!("{}.{}", id, SOURCE_EXTENSION)),
            directory,
        }
    }

    /// All record files under the root, in file-name order.
    ///
    /// A missing root is treated as an empty archive.
    pub fn record_files(&self) -> Result<Vec<PathBuf>, ArchiveError> {
        if !self.root.exists() {
            warn!("Archive {} does not exist", self.root.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            let is_record = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == RECORD_EXTENSION);
            if entry.file_type().is_file() && is_record {
                files.push(entry.into_path());
            }
        }

        debug!("Found {} record files in {}", files.len(), self.root.display());
        Ok(files)
    }
}
