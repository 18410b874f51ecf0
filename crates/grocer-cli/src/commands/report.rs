//! Report command - rank keywords by total spend.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use grocer_core::report::RankedKeyword;
use grocer_core::{aggregate_archive, rank_keywords, render_table, ArchiveLayout, GrocerConfig};

use super::parse::OutputFormat;

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Number of keywords to show
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Seed for picking example lines
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: ReportArgs, config: &GrocerConfig) -> anyhow::Result<()> {
    let top_n = args.top.unwrap_or(config.report.top_n);
    let rng = match args.seed.or(config.report.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let layout = ArchiveLayout::new(&config.paths.database);
    let stats = aggregate_archive(&layout, rng)?;
    debug!("{} distinct keywords", stats.len());

    let ranked = rank_keywords(stats.values(), top_n);

    let output = match args.format {
        OutputFormat::Text => render_table(&ranked, top_n),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Tsv => format_ranking_tsv(&ranked)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn format_ranking_tsv(ranked: &[RankedKeyword]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(vec![]);

    wtr.write_record(["rank", "total_cost", "keyword", "occurrence_count", "example"])?;

    for entry in ranked {
        wtr.write_record([
            &entry.rank.to_string(),
            &entry.stat.total_cost.to_string(),
            &entry.stat.keyword,
            &entry.stat.occurrence_count.to_string(),
            &entry.stat.example,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
