//! Tabular export of the categorized transaction set
//!
//! Two shapes share one column order: CSV text, and an Excel workbook with a
//! single "Transactions" worksheet.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Column order of the exported table
pub const EXPORT_COLUMNS: [&str; 7] = [
    "date",
    "description",
    "memo",
    "amount",
    "transaction_type",
    "category",
    "source_file",
];

/// Worksheet name used by the workbook export
pub const EXPORT_SHEET: &str = "Transactions";

/// Output file shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Pick the shape from a file extension; anything but `.xlsx` is CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "Excel",
        }
    }
}

/// Write transactions as CSV, one row per transaction in batch order
///
/// Dates are ISO formatted; undated rows get an empty date cell.
pub fn write_transactions_csv<'a, W, I>(writer: W, transactions: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;

    let mut count = 0;
    for tx in transactions {
        let date = tx.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let amount = tx.amount.to_string();
        wtr.write_record([
            date.as_str(),
            tx.description.as_str(),
            tx.memo.as_str(),
            amount.as_str(),
            tx.transaction_type.as_str(),
            tx.category.as_str(),
            tx.source_file.as_str(),
        ])?;
        count += 1;
    }

    wtr.flush()?;
    Ok(count)
}

/// Export transactions to an in-memory CSV string
pub fn export_transactions_csv<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<String> {
    let mut buf = Vec::new();
    write_transactions_csv(&mut buf, transactions)?;
    String::from_utf8(buf).map_err(|e| Error::Export(e.to_string()))
}

/// Build an xlsx workbook of the transactions, returning its bytes and the
/// row count
///
/// Dates are real date cells and amounts are numbers; undated rows leave
/// the date cell empty.
pub fn write_transactions_xlsx<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<(Vec<u8>, usize)> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let amount_format = Format::new().set_num_format("0.00");

    let mut count = 0;
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(EXPORT_SHEET)?;

        for (col, name) in (0u16..).zip(EXPORT_COLUMNS) {
            sheet.write_string(0, col, name)?;
        }

        for tx in transactions {
            let row = u32::try_from(count + 1)
                .map_err(|_| Error::Export("Too many rows for a worksheet".into()))?;

            if let Some(date) = tx.date {
                let cell = ExcelDateTime::from_ymd(
                    u16::try_from(date.year())
                        .map_err(|_| Error::Export(format!("Date out of range: {}", date)))?,
                    date.month() as u8,
                    date.day() as u8,
                )?;
                sheet.write_datetime_with_format(row, 0, &cell, &date_format)?;
            }
            sheet.write_string(row, 1, &tx.description)?;
            sheet.write_string(row, 2, &tx.memo)?;
            sheet.write_number_with_format(
                row,
                3,
                tx.amount.to_f64().unwrap_or_default(),
                &amount_format,
            )?;
            sheet.write_string(row, 4, &tx.transaction_type)?;
            sheet.write_string(row, 5, &tx.category)?;
            sheet.write_string(row, 6, &tx.source_file)?;
            count += 1;
        }
    }

    Ok((workbook.save_to_buffer()?, count))
}

/// Export transactions to a file in the given shape, replacing it if present
pub fn export_to_path<'a>(
    path: &Path,
    format: ExportFormat,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<usize> {
    let create_failed =
        |e: std::io::Error| Error::Export(format!("Failed to create {}: {}", path.display(), e));

    let count = match format {
        ExportFormat::Csv => {
            let file = File::create(path).map_err(create_failed)?;
            write_transactions_csv(file, transactions)?
        }
        ExportFormat::Xlsx => {
            let (bytes, count) = write_transactions_xlsx(transactions)?;
            fs::write(path, bytes).map_err(create_failed)?;
            count
        }
    };

    info!(
        "Exported {} transactions to {} ({})",
        count,
        path.display(),
        format.as_str()
    );
    Ok(count)
}
