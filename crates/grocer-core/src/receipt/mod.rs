//! Receipt line parsing.

mod parser;
pub mod rules;

pub use parser::{receipt_lines, LineParser, ParseItems};
