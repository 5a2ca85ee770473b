//! Export and sheet sync command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spendlens_core::{
    append_summary, export_to_path, Config, CsvSheet, ExportFormat, SheetSummary,
};

use super::load_batch;

/// Export the categorized table, applying row edits first
///
/// An `.xlsx` output gets an Excel workbook; any other name gets CSV.
/// Row numbers in `edits` and `drops` refer to the batch as loaded (0-based);
/// drops are applied after edits, highest row first.
pub fn cmd_export(
    config: &Config,
    files: &[PathBuf],
    output: &Path,
    edits: &[(usize, String)],
    drops: &[usize],
) -> Result<()> {
    let mut batch = load_batch(config, files)?.batch;

    for (row, category) in edits {
        batch
            .set_category(*row, category)
            .with_context(|| format!("Cannot recategorize row {}", row))?;
    }

    let mut drops = drops.to_vec();
    drops.sort_unstable();
    drops.dedup();
    for row in drops.into_iter().rev() {
        batch
            .remove(row)
            .with_context(|| format!("Cannot remove row {}", row))?;
    }

    let format = ExportFormat::from_path(output);
    let count = export_to_path(output, format, &batch)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    println!(
        "✅ Exported {} transactions to {} ({})",
        count,
        output.display(),
        format.as_str()
    );
    Ok(())
}

/// Append the batch summary to a sheet
pub fn cmd_sync(config: &Config, files: &[PathBuf], sheet: &Path) -> Result<()> {
    let report = load_batch(config, files)?;
    let sheet = CsvSheet::open(sheet).context("Failed to open sheet")?;

    let result = append_summary(&sheet, &SheetSummary::from_transactions(&report.batch))
        .context("Failed to update sheet")?;

    println!(
        "✅ Summary added to {} at row {}",
        result.sheet, result.row_number
    );
    Ok(())
}
