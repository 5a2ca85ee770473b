//! Spendlens CLI - Bank statement categorizer
//!
//! Usage:
//!   spendlens summary FILES...               Totals and category breakdown
//!   spendlens transactions FILES...          List categorized transactions
//!   spendlens export FILES... -o out.xlsx    Export the categorized table (.xlsx or .csv)
//!   spendlens sync FILES... --sheet s.csv    Append a summary row to a sheet

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so `summary --json` stays machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = commands::load_config(cli.rules.as_deref())?;

    match cli.command {
        Commands::Summary { files, json } => commands::cmd_summary(&config, &files, json),
        Commands::Transactions {
            files,
            categories,
            kind,
            months,
            limit,
        } => commands::cmd_transactions(&config, &files, categories, &kind, months, limit),
        Commands::Categories => commands::cmd_categories(&config),
        Commands::Classify {
            description,
            memo,
            tran_type,
        } => commands::cmd_classify(&config, &description, &memo, &tran_type),
        Commands::Export {
            files,
            output,
            edits,
            drops,
        } => commands::cmd_export(&config, &files, &output, &edits, &drops),
        Commands::Sync { files, sheet } => commands::cmd_sync(&config, &files, &sheet),
    }
}
