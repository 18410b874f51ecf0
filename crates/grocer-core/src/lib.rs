//! Core library for filing OCR'd grocery receipts and reporting spend.
//!
//! This crate provides:
//! - A line parser turning noisy OCR text into `(description, price)` items
//! - A receipt importer filing text, record and PDF into a dated archive
//! - The tab-separated record codec used by the archive
//! - Keyword cost aggregation and ranking over archived records

pub mod archive;
pub mod error;
pub mod import;
pub mod models;
pub mod receipt;
pub mod report;

pub use error::{AmountOverflow, ArchiveError, GrocerError, ImportError, Result};
pub use models::config::GrocerConfig;
pub use models::receipt::{ImportSummary, ImportedReceipt, ItemTally, ParsedItem, Price};
pub use archive::ArchiveLayout;
pub use import::{ReceiptIdSource, ReceiptImporter, SequentialIds, UuidIds};
pub use receipt::{receipt_lines, LineParser};
pub use report::{aggregate_archive, rank_keywords, render_table, KeywordAggregator, KeywordStat};
