//! Parse command - preview how a receipt text file will be read.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::debug;

use grocer_core::archive::RecordWriter;
use grocer_core::{receipt_lines, GrocerConfig, ItemTally, LineParser, ParsedItem};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Receipt text file (one item per line, price last)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON output
    Json,
    /// Tab-separated, as stored in the archive
    Tsv,
}

#[derive(Serialize)]
struct ParsedReceipt {
    items: Vec<ParsedItem>,
    tally: ItemTally,
    warnings: Vec<String>,
}

pub fn run(args: ParseArgs, config: &GrocerConfig) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = fs::read_to_string(&args.input)?;
    let parser = LineParser::from_config(&config.parser);

    let mut parsed = parser.parse_items(receipt_lines(&text));
    let items: Vec<ParsedItem> = parsed.by_ref().collect();
    let warnings = parsed.into_warnings();

    let mut tally = ItemTally::default();
    for item in &items {
        tally.add(item)?;
    }
    debug!("Parsed {} items from {}", tally.item_count, args.input.display());

    let receipt = ParsedReceipt {
        items,
        tally,
        warnings,
    };

    match args.format {
        OutputFormat::Text => print!("{}", format_receipt_text(&receipt)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&receipt)?),
        OutputFormat::Tsv => print!("{}", format_receipt_tsv(&receipt.items)?),
    }

    if !receipt.warnings.is_empty() {
        eprintln!("{}", style("Lines without a price:").yellow());
        for warning in &receipt.warnings {
            eprintln!("  - {}", warning);
        }
    }

    Ok(())
}

fn format_receipt_text(receipt: &ParsedReceipt) -> String {
    let mut output = String::new();

    for item in &receipt.items {
        output.push_str(&format!("{:<40} {:>10}\n", item.description, item.price.to_string()));
    }
    output.push('\n');
    output.push_str(&format!("Items: {}\n", receipt.tally.item_count));
    output.push_str(&format!("Total: {:.2}\n", receipt.tally.total));

    output
}

fn format_receipt_tsv(items: &[ParsedItem]) -> anyhow::Result<String> {
    let mut writer = RecordWriter::from_writer(Vec::new());
    for item in items {
        writer.write_item(item)?;
    }
    Ok(String::from_utf8(writer.finish()?)?)
}
