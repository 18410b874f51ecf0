//! Ranking keywords by total spend.

use std::fmt::Write;

use serde::Serialize;

use super::aggregator::KeywordStat;

/// Default number of keywords in a report.
pub const DEFAULT_TOP_N: usize = 10;

/// A keyword and its 1-based position in the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedKeyword {
    pub rank: usize,
    #[serde(flatten)]
    pub stat: KeywordStat,
}

/// Sort by total cost, highest first, and keep the first `top_n`.
///
/// Equal totals are ordered by keyword so the output is stable.
pub fn rank_keywords<'a, I>(stats: I, top_n: usize) -> Vec<RankedKeyword>
where
    I: IntoIterator<Item = &'a KeywordStat>,
{
    let mut sorted: Vec<&KeywordStat> = stats.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.total_cost
            .cmp(&a.total_cost)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    sorted
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, stat)| RankedKeyword {
            rank: i + 1,
            stat: stat.clone(),
        })
        .collect()
}

/// Render the ranking as a fixed-width table.
pub fn render_table(ranked: &[RankedKeyword], top_n: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Top {} Expensive Grocery Keywords ===", top_n);
    let _ = writeln!(
        out,
        "{:<6}{:>12}  {:<24}{:>7}  {}",
        "RANK", "TOTAL", "KEYWORD", "COUNT", "EXAMPLE"
    );

    for entry in ranked {
        let _ = writeln!(
            out,
            "{:<6}{:>12}  {:<24}{:>7}  \"{}\"",
            format!("#{}", entry.rank),
            format!("${:.2}", entry.stat.total_cost),
            entry.stat.keyword,
            format!("x{}", entry.stat.occurrence_count),
            entry.stat.example
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn stat(keyword: &str, total: &str, count: u64) -> KeywordStat {
        KeywordStat {
            keyword: keyword.to_string(),
            total_cost: Decimal::from_str(total).unwrap(),
            occurrence_count: count,
            example: format!("{keyword} EXAMPLE"),
        }
    }

    #[test]
    fn test_rank_orders_by_total_descending() {
        let stats = vec![
            stat("ORGANIC", "2.50", 1),
            stat("MILK", "5.50", 2),
            stat("CHOCOLATE", "3.00", 1),
        ];

        let ranked = rank_keywords(&stats, DEFAULT_TOP_N);
        let order: Vec<_> = ranked
            .iter()
            .map(|r| (r.rank, r.stat.keyword.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "MILK"), (2, "CHOCOLATE"), (3, "ORGANIC")]);

        let max = stats.iter().map(|s| s.total_cost).max().unwrap();
        assert_eq!(ranked[0].stat.total_cost, max);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].stat.total_cost >= w[1].stat.total_cost));
    }

    #[test]
    fn test_ties_break_by_keyword() {
        let stats = vec![stat("ZUCCHINI", "1.00", 1), stat("APPLE", "1.00", 1)];
        let ranked = rank_keywords(&stats, DEFAULT_TOP_N);
        assert_eq!(ranked[0].stat.keyword, "APPLE");
        assert_eq!(ranked[1].stat.keyword, "ZUCCHINI");
    }

    #[test]
    fn test_top_n_limit() {
        let stats: Vec<_> = (1..=15)
            .map(|i| stat(&format!("K{i:02}"), &format!("{i}.00"), 1))
            .collect();

        let ranked = rank_keywords(&stats, 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].stat.keyword, "K15");
        assert_eq!(ranked[9].stat.keyword, "K06");

        assert!(rank_keywords(&stats, 0).is_empty());
    }

    #[test]
    fn test_render_table() {
        let stats = vec![stat("MILK", "5.5", 2)];
        let table = render_table(&rank_keywords(&stats, 10), 10);

        assert_eq!(
            table,
            concat!(
                "=== Top 10 Expensive Grocery Keywords ===\n",
                "RANK         TOTAL  KEYWORD                   COUNT  EXAMPLE\n",
                "#1           $5.50  MILK                         x2  \"MILK EXAMPLE\"\n",
            )
        );
    }
}
