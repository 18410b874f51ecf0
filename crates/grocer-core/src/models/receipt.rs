//! Receipt item models.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AmountOverflow;

/// Textual form of [`Price::Unknown`] inside structured records.
pub const UNKNOWN_PRICE_TOKEN: &str = "NaN";

/// Price of a receipt line.
///
/// `Unknown` means no price could be read from the line. It is never
/// equal to any real amount, zero included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "amount")]
pub enum Price {
    Known(Decimal),
    Unknown,
}

impl Price {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Price::Known(amount) => Some(*amount),
            Price::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Price::Known(_))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Price::Known(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Known(amount) => write!(f, "{}", amount),
            Price::Unknown => f.write_str(UNKNOWN_PRICE_TOKEN),
        }
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(UNKNOWN_PRICE_TOKEN) {
            return Ok(Price::Unknown);
        }
        Decimal::from_str(s).map(Price::Known)
    }
}

/// One normalized receipt line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedItem {
    /// Item text, never containing a tab.
    pub description: String,
    pub price: Price,
}

impl ParsedItem {
    pub fn new(description: impl Into<String>, price: Price) -> Self {
        Self {
            description: description.into(),
            price,
        }
    }

    pub fn priced(description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(description, Price::Known(amount))
    }

    pub fn unpriced(description: impl Into<String>) -> Self {
        Self::new(description, Price::Unknown)
    }
}

/// Running item count and known-price total for one receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemTally {
    pub item_count: usize,
    pub unpriced_count: usize,
    pub total: Decimal,
}

impl ItemTally {
    /// Count the item; only known prices add to the total.
    ///
    /// The tally is left unchanged if the total would overflow.
    pub fn add(&mut self, item: &ParsedItem) -> Result<(), AmountOverflow> {
        match item.price {
            Price::Known(amount) => {
                self.total = self.total.checked_add(amount).ok_or_else(|| AmountOverflow {
                    subject: "receipt".to_string(),
                })?;
            }
            Price::Unknown => self.unpriced_count += 1,
        }
        self.item_count += 1;
        Ok(())
    }
}

/// Outcome of filing one receipt into the archive.
#[derive(Debug, Clone, Serialize)]
pub struct ImportedReceipt {
    /// Identifier shared by the `.txt`, `.tsv` and `.pdf` files.
    pub id: String,
    /// Staging basename the receipt came from.
    pub basename: String,
    /// Dated archive directory holding the receipt.
    pub directory: PathBuf,
    /// Number of rows written, unpriced rows included.
    pub item_count: usize,
    /// Rows whose price could not be read.
    pub unpriced_count: usize,
    /// Sum of known prices.
    pub total: Decimal,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: Vec<ImportedReceipt>,
    /// Staged files that were left in place because their counterpart is missing.
    pub skipped: Vec<String>,
}

impl ImportSummary {
    pub fn receipt_count(&self) -> usize {
        self.imported.len()
    }
}
