//! Data models shared by the importer and the reporter.

pub mod config;
pub mod receipt;

pub use config::{GrocerConfig, ParserConfig, PathsConfig, ReportConfig};
pub use receipt::{
    ImportSummary, ImportedReceipt, ItemTally, ParsedItem, Price, UNKNOWN_PRICE_TOKEN,
};
