//! Per-keyword spending totals over the archive.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::archive::{ArchiveLayout, RecordReader};
use crate::error::{AmountOverflow, ArchiveError};
use crate::models::receipt::{ParsedItem, Price};

/// Spending attributed to one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordStat {
    pub keyword: String,
    /// Sum of the prices of every line containing the keyword.
    pub total_cost: Decimal,
    /// Number of priced lines containing the keyword.
    pub occurrence_count: u64,
    /// One uppercased line containing the keyword.
    pub example: String,
}

/// Keyword statistics, keyed by keyword.
pub type KeywordStats = HashMap<String, KeywordStat>;

/// The distinct uppercased whitespace-separated tokens of a description.
pub fn keywords(description: &str) -> BTreeSet<String> {
    description
        .to_uppercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Accumulates keyword statistics from priced receipt lines.
///
/// The example kept for a keyword is a size-one sample: once set, each new
/// line replaces it with probability one half. Seed the random source to
/// make the examples reproducible; totals and counts never depend on it.
pub struct KeywordAggregator<R = StdRng> {
    stats: KeywordStats,
    rng: R,
    rows: usize,
}

impl KeywordAggregator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> KeywordAggregator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            stats: HashMap::new(),
            rng,
            rows: 0,
        }
    }

    /// Add one line. Lines without a known price are ignored.
    ///
    /// Fails without changing any statistic if a keyword total would
    /// overflow.
    pub fn observe(&mut self, item: &ParsedItem) -> Result<(), AmountOverflow> {
        let Price::Known(price) = item.price else {
            return Ok(());
        };

        let keywords = keywords(&item.description);
        for keyword in &keywords {
            if let Some(stat) = self.stats.get(keyword) {
                if stat.total_cost.checked_add(price).is_none() {
                    return Err(AmountOverflow {
                        subject: format!("keyword '{keyword}'"),
                    });
                }
            }
        }
        self.rows += 1;

        let example = item.description.to_uppercase();
        for keyword in keywords {
            match self.stats.get_mut(&keyword) {
                Some(stat) => {
                    stat.total_cost += price;
                    stat.occurrence_count += 1;
                    if self.rng.random_bool(0.5) {
                        stat.example.clone_from(&example);
                    }
                }
                None => {
                    self.stats.insert(
                        keyword.clone(),
                        KeywordStat {
                            keyword,
                            total_cost: price,
                            occurrence_count: 1,
                            example: example.clone(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Add every row of a record file.
    ///
    /// Returns the number of rows read. A corrupt row aborts with an error.
    pub fn add_record_file(&mut self, path: &Path) -> Result<usize, ArchiveError> {
        let mut count = 0;
        for item in RecordReader::open(path)? {
            self.observe(&item?)?;
            count += 1;
        }
        debug!("Read {} rows from {}", count, path.display());
        Ok(count)
    }

    /// Add every record file in the archive.
    pub fn add_archive(&mut self, layout: &ArchiveLayout) -> Result<usize, ArchiveError> {
        let files = layout.record_files()?;
        for path in &files {
            self.add_record_file(path)?;
        }
        info!(
            "Aggregated {} priced rows from {} receipts into {} keywords",
            self.rows,
            files.len(),
            self.stats.len()
        );
        Ok(files.len())
    }

    /// Number of priced rows observed.
    pub fn priced_rows(&self) -> usize {
        self.rows
    }

    pub fn stats(&self) -> &KeywordStats {
        &self.stats
    }

    pub fn into_stats(self) -> KeywordStats {
        self.stats
    }
}

/// Aggregate the whole archive in one pass.
///
/// Any corrupt record fails the pass; partial statistics are never returned.
pub fn aggregate_archive<R: Rng>(
    layout: &ArchiveLayout,
    rng: R,
) -> Result<KeywordStats, ArchiveError> {
    let mut aggregator = KeywordAggregator::with_rng(rng);
    aggregator.add_archive(layout)?;
    Ok(aggregator.into_stats())
}
