//! Receipt line parser tolerant of OCR noise.

use tracing::{trace, warn};

use crate::archive::FIELD_DELIMITER;
use crate::models::config::ParserConfig;
use crate::models::receipt::{ParsedItem, Price};

use super::rules::{strip_tax_marker, PriceExtractor};

/// Turns OCR'd receipt lines into `(description, price)` items.
///
/// Lines are expected to carry the price last. A line without a
/// recognizable price is kept with [`Price::Unknown`] and a warning
/// rather than rejected.
pub struct LineParser {
    /// Prefixes of OCR tool annotation lines to drop.
    metadata_prefixes: Vec<String>,
    /// Whether to strip trailing taxable markers.
    strip_tax_markers: bool,
    extractor: PriceExtractor,
}

impl LineParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ParserConfig::default())
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self {
            metadata_prefixes: config.metadata_prefixes.clone(),
            strip_tax_markers: config.strip_tax_markers,
            extractor: PriceExtractor::new(),
        }
    }

    /// Replace the metadata prefixes.
    pub fn with_metadata_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set tax marker stripping.
    pub fn with_tax_markers(mut self, strip: bool) -> Self {
        self.strip_tax_markers = strip;
        self
    }

    /// Parse one raw line. `None` means the line carries no item.
    pub fn parse_line(&self, raw: &str) -> Option<ParsedItem> {
        let mut line = raw.trim();

        if self.strip_tax_markers {
            line = strip_tax_marker(line);
        }

        if line.is_empty() {
            return None;
        }

        if self.is_metadata(line) {
            trace!("Skipping OCR metadata line: {}", line);
            return None;
        }

        let (description, price) = match self.extractor.extract(line) {
            Some(found) => {
                let start = found.position.map_or(line.len(), |(start, _)| start);
                (line[..start].trim(), Price::Known(found.value))
            }
            None => {
                warn!("Unable to find a price in: {}", line);
                (line, Price::Unknown)
            }
        };

        Some(ParsedItem::new(
            description.replace([FIELD_DELIMITER, '\r', '\n'], " "),
            price,
        ))
    }

    /// Lazily parse a sequence of lines, preserving order.
    pub fn parse_items<I>(&self, lines: I) -> ParseItems<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        ParseItems {
            parser: self,
            lines: lines.into_iter(),
            warnings: Vec::new(),
        }
    }

    fn is_metadata(&self, line: &str) -> bool {
        self.metadata_prefixes
            .iter()
            .any(|prefix| line.starts_with(prefix.as_str()))
    }
}

/// Split receipt text into lines on `\n`, `\r\n` or a lone `\r`.
///
/// A `\r\n` pair yields an extra empty line, which the parser skips.
pub fn receipt_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n'])
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the items of a receipt.
///
/// Skipped lines produce nothing; every other line yields exactly one item.
pub struct ParseItems<'p, I> {
    parser: &'p LineParser,
    lines: I,
    warnings: Vec<String>,
}

impl<I> ParseItems<'_, I> {
    /// Warnings for lines whose price could not be read, so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

impl<I> Iterator for ParseItems<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = ParsedItem;

    fn next(&mut self) -> Option<ParsedItem> {
        for raw in self.lines.by_ref() {
            if let Some(item) = self.parser.parse_line(raw.as_ref()) {
                if !item.price.is_known() {
                    self.warnings
                        .push(format!("unable to find a price in: {}", item.description));
                }
                return Some(item);
            }
        }
        None
    }
}
