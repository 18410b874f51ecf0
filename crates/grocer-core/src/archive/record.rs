//! Structured record files: `<description>\t<price>` per line.
//!
//! No quoting or escaping is performed. Descriptions must not contain the
//! field delimiter; the line parser replaces it before items get here.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::ArchiveError;
use crate::models::receipt::{ParsedItem, Price};

/// Separator between the description and price fields.
pub const FIELD_DELIMITER: char = '\t';

type Result<T> = std::result::Result<T, ArchiveError>;

/// Writes receipt items as structured record rows.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl RecordWriter<File> {
    /// Create (or truncate) a record file.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        let inner = WriterBuilder::new()
            .delimiter(FIELD_DELIMITER as u8)
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(writer);
        Self { inner }
    }

    /// Append one item. Unknown prices are written as `NaN`.
    pub fn write_item(&mut self, item: &ParsedItem) -> Result<()> {
        let price = item.price.to_string();
        self.inner
            .write_record([item.description.as_str(), price.as_str()])?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| ArchiveError::Io(e.into_error()))
    }
}

/// Reads structured record rows back into items.
///
/// Any row that is not exactly `description, price` or whose price is
/// neither a number nor the unknown-price token is an error.
pub struct RecordReader<R: Read> {
    inner: csv::Reader<R>,
    path: PathBuf,
    record: StringRecord,
}

impl RecordReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_reader(File::open(path)?, path))
    }
}

impl<R: Read> RecordReader<R> {
    /// `path` is only used to label errors.
    pub fn from_reader(reader: R, path: impl Into<PathBuf>) -> Self {
        let inner = ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER as u8)
            .quoting(false)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            inner,
            path: path.into(),
            record: StringRecord::new(),
        }
    }

    fn read_item(&mut self) -> Result<Option<ParsedItem>> {
        if !self.inner.read_record(&mut self.record)? {
            return Ok(None);
        }

        let line = self.record.position().map_or(0, |p| p.line());

        if self.record.len() != 2 {
            return Err(ArchiveError::MalformedRow {
                path: self.path.clone(),
                line,
                fields: self.record.len(),
            });
        }

        let price_field = &self.record[1];
        let price: Price = price_field
            .parse()
            .map_err(|_| ArchiveError::InvalidPrice {
                path: self.path.clone(),
                line,
                value: price_field.to_string(),
            })?;

        Ok(Some(ParsedItem::new(&self.record[0], price)))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<ParsedItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_item().transpose()
    }
}

/// Write all items to a new record file.
pub fn write_records<'a, I>(path: &Path, items: I) -> Result<()>
where
    I: IntoIterator<Item = &'a ParsedItem>,
{
    let mut writer = RecordWriter::create(path)?;
    for item in items {
        writer.write_item(item)?;
    }
    writer.finish()?;
    Ok(())
}

/// Read every item of a record file.
pub fn read_records(path: &Path) -> Result<Vec<ParsedItem>> {
    RecordReader::open(path)?.collect()
}
