//! Keyword spending report over the archive.

pub mod aggregator;
pub mod ranking;

pub use aggregator::{aggregate_archive, keywords, KeywordAggregator, KeywordStat, KeywordStats};
pub use ranking::{rank_keywords, render_table, RankedKeyword, DEFAULT_TOP_N};
