//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendlens - See where the money went
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Categorize bank statement exports and summarize spending", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Category rules file (TOML)
    ///
    /// Defaults to ~/.local/share/spendlens/config/categories.toml when it
    /// exists, otherwise the built-in rules.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show totals, category breakdown and monthly spend
    Summary {
        /// Statement files (.xlsx, .xls, .ods, .csv)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categorized transactions
    Transactions {
        /// Statement files (.xlsx, .xls, .ods, .csv)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only show these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Transaction kind: all, expenses, income
        #[arg(short, long, default_value = "all")]
        kind: String,

        /// Only show these months, YYYY-MM (repeatable)
        #[arg(short, long = "month")]
        months: Vec<String>,

        /// Maximum rows to print
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// List categories and their keywords
    Categories,

    /// Classify a single description
    Classify {
        /// Transaction description (payee)
        description: String,

        /// Memo / particulars
        #[arg(long, default_value = "")]
        memo: String,

        /// Transaction type, e.g. "Deposit"
        #[arg(long = "type", default_value = "")]
        tran_type: String,
    },

    /// Export categorized transactions to CSV, or Excel for an .xlsx output
    Export {
        /// Statement files (.xlsx, .xls, .ods, .csv)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file (.xlsx for Excel, anything else for CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Recategorize a row before export, as ROW=CATEGORY (repeatable)
        #[arg(long = "set", value_parser = parse_edit)]
        edits: Vec<(usize, String)>,

        /// Remove a row before export (repeatable)
        #[arg(long = "drop")]
        drops: Vec<usize>,
    },

    /// Append a summary row to a sheet
    Sync {
        /// Statement files (.xlsx, .xls, .ods, .csv)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Sheet file (CSV with a header row)
        #[arg(short, long)]
        sheet: PathBuf,
    },
}

/// Parse a ROW=CATEGORY edit
pub fn parse_edit(s: &str) -> Result<(usize, String), String> {
    let (row, category) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=CATEGORY, got '{}'", s))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid row number: '{}'", row))?;
    let category = category.trim();
    if category.is_empty() {
        return Err("category cannot be empty".to_string());
    }
    Ok((row, category.to_string()))
}
