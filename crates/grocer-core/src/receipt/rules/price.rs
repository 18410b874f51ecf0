//! Price extraction from the end of a receipt line.

use rust_decimal::Decimal;
use tracing::warn;

use super::ExtractionMatch;
use super::patterns::{PRICE_SUFFIX, TAX_MARKER};

/// Finds the end-anchored price on a receipt line.
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the trailing price, normalizing the separator to a period.
    ///
    /// A price that is not at the very end of the line is ignored.
    pub fn extract(&self, line: &str) -> Option<ExtractionMatch<Decimal>> {
        let caps = PRICE_SUFFIX.captures(line)?;
        let full_match = caps.get(0)?;

        let amount_str = format!("{}.{}", &caps[1], &caps[2]);
        let amount = match Decimal::from_str_exact(&amount_str) {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Ignoring price {} that cannot be held exactly: {}", amount_str, e);
                return None;
            }
        };

        Some(
            ExtractionMatch::new(amount, full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop a trailing taxable marker and re-trim.
///
/// `"EGGS T"` becomes `"EGGS"`, `"T"` becomes `""`. Words that merely end
/// in `T` are left alone.
pub fn strip_tax_marker(line: &str) -> &str {
    match TAX_MARKER.captures(line) {
        Some(caps) => {
            let marker = caps.get(1).or_else(|| caps.get(2));
            match marker {
                Some(m) => line[..m.start()].trim(),
                None => line,
            }
        }
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extract_all_separators() {
        let extractor = PriceExtractor::new();
        for line in ["MILK 2.50", "MILK 2,50", "MILK 2-50", "MILK 2:50"] {
            let found = extractor.extract(line).unwrap();
            assert_eq!(found.value, dec("2.50"), "line {line:?}");
            assert_eq!(found.position, Some((5, 9)));
        }
    }

    #[test]
    fn test_extract_requires_end_anchor() {
        let extractor = PriceExtractor::new();
        assert!(extractor.extract("2.50 MILK").is_none());
        assert!(extractor.extract("MILK 2.5").is_none());
        assert!(extractor.extract("MILK 2.505").is_none());
        assert!(extractor.extract("MILK 2.50 EA").is_none());
    }

    #[test]
    fn test_extract_multi_digit_integer_part() {
        let extractor = PriceExtractor::new();
        let found = extractor.extract("TURKEY 1234,99").unwrap();
        assert_eq!(found.value, dec("1234.99"));
        assert_eq!(found.source, "1234,99");
    }

    #[test]
    fn test_extract_rejects_amount_that_would_round() {
        let extractor = PriceExtractor::new();
        assert!(extractor.extract("GOLD 9999999999999999999999999999.99").is_none());

        let found = extractor.extract("GOLD 99999999999999999999999999.99").unwrap();
        assert_eq!(found.value.to_string(), "99999999999999999999999999.99");
    }

    #[test]
    fn test_strip_tax_marker() {
        assert_eq!(strip_tax_marker("EGGS T"), "EGGS");
        assert_eq!(strip_tax_marker("MILK 2.50 T"), "MILK 2.50");
        assert_eq!(strip_tax_marker("MILK 2.50T"), "MILK 2.50");
        assert_eq!(strip_tax_marker("MILK 2.50 7"), "MILK 2.50");
        assert_eq!(strip_tax_marker("T"), "");
        assert_eq!(strip_tax_marker("YOGURT"), "YOGURT");
        assert_eq!(strip_tax_marker("BREAD 1.99"), "BREAD 1.99");
    }
}
