//! CLI for filing OCR'd grocery receipts and reporting keyword spending.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, import, parse, report};

/// Grocery receipts - file OCR'd receipts and find where the money goes
#[derive(Parser)]
#[command(name = "grocer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Staging directory with <name>.txt and <name>.pdf pairs
    #[arg(long, global = true)]
    inbox: Option<PathBuf>,

    /// Archive root directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// File every staged receipt into the archive
    Import(import::ImportArgs),

    /// Report the keywords with the highest total spend
    Report(report::ReportArgs),

    /// Parse a single receipt text file without importing it
    Parse(parse::ParseArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut settings = commands::load_config(cli.config.as_deref())?;
    if let Some(inbox) = cli.inbox {
        settings.paths.inbox = inbox;
    }
    if let Some(database) = cli.database {
        settings.paths.database = database;
    }

    match cli.command {
        Commands::Import(args) => import::run(args, &settings),
        Commands::Report(args) => report::run(args, &settings),
        Commands::Parse(args) => parse::run(args, &settings),
        Commands::Config(args) => config::run(args, &settings),
    }
}
