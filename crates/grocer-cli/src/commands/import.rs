//! Import command - file staged receipts into the archive.

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use tracing::info;

use grocer_core::{GrocerConfig, ReceiptImporter};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// File receipts under this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub fn run(args: ImportArgs, config: &GrocerConfig) -> anyhow::Result<()> {
    config.paths.ensure_dirs()?;

    // Receipts are filed under the import date, not the purchase date
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!(
        "Importing from {} into {}",
        config.paths.inbox.display(),
        config.paths.database.display()
    );

    let mut importer = ReceiptImporter::from_config(config);
    let summary = importer.import_all(date)?;

    for path in &summary.skipped {
        println!("{} Left in inbox: {}", style("!").yellow(), path);
    }

    for receipt in &summary.imported {
        println!(
            "{} Imported {} items with total price {:.2} as {}",
            style("✓").green(),
            receipt.item_count,
            receipt.total,
            receipt.id
        );
        if receipt.unpriced_count > 0 {
            println!(
                "   {} without a readable price",
                style(receipt.unpriced_count).yellow()
            );
        }
    }

    println!("Imported {} receipts", summary.receipt_count());

    Ok(())
}
