//! Regex patterns for OCR'd receipt lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Price at the very end of a line. OCR confuses the decimal point with
    // ',', '-' and ':' so all four are accepted.
    pub static ref PRICE_SUFFIX: Regex = Regex::new(
        r"([0-9]+)[.,:\-]([0-9]{2})$"
    ).unwrap();

    // Taxable marker: a bare trailing "T" (alone, after whitespace, or glued
    // to the price) or " 7", which is how OCR tends to read a "T".
    pub static ref TAX_MARKER: Regex = Regex::new(
        r"(?:^|[\s0-9])(T)$|\s(7)$"
    ).unwrap();
}
