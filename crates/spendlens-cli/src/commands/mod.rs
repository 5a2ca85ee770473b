//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `summary` - Totals, category breakdown and monthly spend
//! - `transactions` - Transaction listing plus category and classify helpers
//! - `export` - CSV export and summary sheet sync

pub mod export;
pub mod summary;
pub mod transactions;

// Re-export command functions for main.rs
pub use export::*;
pub use summary::*;
pub use transactions::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spendlens_core::{Config, IngestOutcome, IngestReport, Pipeline, Upload};
use tracing::debug;

/// Load the rule table, honouring `--rules`
pub fn load_config(rules: Option<&Path>) -> Result<Config> {
    let config = Config::load(rules).context("Failed to load category rules")?;
    debug!(
        "Using {} categories, preamble of {} lines",
        config.rules.len(),
        config.ingest.preamble_lines
    );
    Ok(config)
}

/// Read, parse and classify statement files
///
/// Per-file problems are printed as warnings; only a run where no file
/// loaded is an error.
pub fn load_batch(config: &Config, files: &[PathBuf]) -> Result<IngestReport> {
    let uploads = files
        .iter()
        .map(|path| {
            Upload::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let outcome = Pipeline::new(config).ingest(&uploads);
    for diagnostic in outcome.diagnostics() {
        eprintln!("⚠️  {}", diagnostic);
    }

    match outcome {
        IngestOutcome::Processed(report) => Ok(report),
        IngestOutcome::NothingToProcess { .. } => {
            anyhow::bail!("No valid transactions found in the uploaded files")
        }
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
