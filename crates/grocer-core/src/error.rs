//! Error types for the grocer-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the grocer library.
#[derive(Error, Debug)]
pub enum GrocerError {
    /// Receipt import error.
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// Archive read/write error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while moving receipts from staging into the archive.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Two staged files differ only in extension case, e.g. `a.txt` and `a.TXT`.
    #[error("conflicting staged files for '{basename}': {first} and {second}")]
    ExtensionConflict {
        basename: String,
        first: String,
        second: String,
    },

    /// The staging directory could not be listed.
    #[error("failed to read staging directory {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The identifier source returned an id that is already filed.
    #[error("receipt id '{id}' is already in use under {directory}")]
    IdInUse { id: String, directory: PathBuf },

    /// The staged text file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadText {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dated archive directory could not be created.
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A staged file could not be moved into the archive.
    #[error("failed to move {from} to {to}: {source}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The structured record could not be written.
    #[error("failed to write record {path}: {source}")]
    WriteRecord {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
}

/// Errors related to structured record files.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Underlying TSV codec failure.
    #[error("TSV error: {0}")]
    Codec(#[from] csv::Error),

    /// Directory walk failure.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A running total left the representable price range.
    #[error(transparent)]
    Overflow(#[from] AmountOverflow),

    /// A row did not have exactly two fields.
    #[error("{path}:{line}: expected 2 fields, found {fields}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        fields: usize,
    },

    /// A price field was neither a number nor the unknown-price token.
    #[error("{path}:{line}: invalid price '{value}'")]
    InvalidPrice {
        path: PathBuf,
        line: u64,
        value: String,
    },
}

/// A sum of prices that does not fit in a [`rust_decimal::Decimal`].
#[derive(Error, Debug)]
#[error("total for {subject} exceeds the supported price range")]
pub struct AmountOverflow {
    pub subject: String,
}

/// Result type for the grocer library.
pub type Result<T> = std::result::Result<T, GrocerError>;
