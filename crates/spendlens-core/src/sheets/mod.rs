//! Summary sheet sync with pluggable sinks
//!
//! A summary sheet is a table whose first row names columns such as
//! "Total Expenses", "Total Income" or a category. Each sync appends one row
//! holding the batch figures under the matching headers.
//!
//! # Architecture
//!
//! - `SummarySink` trait defines the interface for sheet backends
//! - `CsvSheet` keeps the sheet as a local CSV file

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::report::SheetSummary;

mod local;

pub use local::CsvSheet;

/// Result of a sync operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
    /// Sink the row went to
    pub sheet: String,
    /// 1-based row number of the appended row (header is row 1)
    pub row_number: usize,
    /// Values written, aligned with the header row
    pub values: Vec<Decimal>,
}

/// Trait for summary sheet destinations
///
/// Implementations handle storing summary rows in different places:
/// - A local CSV file
/// - A hosted spreadsheet
pub trait SummarySink {
    /// Human-readable name for this sink
    fn name(&self) -> &str;

    /// The sheet's header row
    fn header_row(&self) -> Result<Vec<String>>;

    /// Append one row of cells, returning its 1-based row number
    fn append_row(&self, cells: &[String]) -> Result<usize>;
}

/// Append a summary row aligned to the sink's headers
pub fn append_summary(sink: &dyn SummarySink, summary: &SheetSummary) -> Result<SyncResult> {
    let headers = sink.header_row()?;
    if headers.is_empty() {
        return Err(Error::Export(format!("{} has no header row", sink.name())));
    }

    let values = summary.row_for_headers(&headers);
    let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    let row_number = sink.append_row(&cells)?;

    info!("Appended summary to {} at row {}", sink.name(), row_number);
    Ok(SyncResult {
        sheet: sink.name().to_string(),
        row_number,
        values,
    })
}
