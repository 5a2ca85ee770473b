//! Statement file parsers
//!
//! Each [`SourceFormat`] turns an uploaded blob into a [`SourceTable`]: the
//! header row plus header-keyed rows of cell text. Column renaming onto the
//! canonical schema happens afterwards in the pipeline, so nothing downstream
//! of `parse` knows which format a row came from.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::SourceFormat;

/// Source column names for one statement shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub date: &'static str,
    pub description: &'static str,
    pub amount: &'static str,
    pub memo: &'static str,
    pub transaction_type: &'static str,
}

impl ColumnSchema {
    /// Columns a file must carry to be loaded
    pub fn required(&self) -> [&'static str; 3] {
        [self.date, self.description, self.amount]
    }

    /// Required columns absent from `headers`, in schema order
    pub fn missing_columns(&self, headers: &[String]) -> Vec<String> {
        self.required()
            .iter()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .map(|col| col.to_string())
            .collect()
    }
}

/// Workbook exports: Transaction Date, Details, Particulars, Amount, Type
const SPREADSHEET_COLUMNS: ColumnSchema = ColumnSchema {
    date: "Transaction Date",
    description: "Details",
    amount: "Amount",
    memo: "Particulars",
    transaction_type: "Type",
};

/// Delimited exports: Date, Payee, Memo, Amount, Tran Type
const DELIMITED_COLUMNS: ColumnSchema = ColumnSchema {
    date: "Date",
    description: "Payee",
    amount: "Amount",
    memo: "Memo",
    transaction_type: "Tran Type",
};

/// One data row keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Cell text for a column, trimmed; None when the column is absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|s| s.trim())
    }

    /// Every cell is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Header row and data rows read from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SourceFormat {
    /// Column names this shape maps onto the canonical schema
    pub fn columns(&self) -> &'static ColumnSchema {
        match self {
            Self::Spreadsheet => &SPREADSHEET_COLUMNS,
            Self::Delimited => &DELIMITED_COLUMNS,
        }
    }

    /// Parse a file body into header-keyed rows
    ///
    /// `preamble_lines` only applies to delimited exports.
    pub fn parse(&self, bytes: &[u8], preamble_lines: usize) -> Result<SourceTable> {
        match self {
            Self::Spreadsheet => parse_spreadsheet(bytes, self.columns()),
            Self::Delimited => parse_delimited(bytes, preamble_lines),
        }
    }
}

/// Parse a delimited export whose header sits below `preamble_lines` lines
/// of account metadata
fn parse_delimited(bytes: &[u8], preamble_lines: usize) -> Result<SourceTable> {
    let body = skip_lines(bytes, preamble_lines);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), String::from_utf8_lossy(v).into_owned()))
            .collect();
        rows.push(row);
    }

    debug!("Parsed {} delimited rows", rows.len());
    Ok(SourceTable { headers, rows })
}

/// Parse the first worksheet of a workbook
///
/// Date cells (and plain numbers in the date column) are rendered as ISO
/// dates so the date parser sees one text form for every source.
fn parse_spreadsheet(bytes: &[u8], columns: &ColumnSchema) -> Result<SourceTable> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(Error::Import("Workbook has no worksheets".into())),
    };

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Ok(SourceTable::default()),
    };
    let date_col = headers.iter().position(|h| h == columns.date);

    let mut rows = Vec::new();
    for cells in row_iter {
        let row: RawRow = headers
            .iter()
            .zip(cells.iter())
            .enumerate()
            .map(|(i, (h, cell))| {
                let text = if Some(i) == date_col {
                    date_cell_text(cell)
                } else {
                    cell_text(cell)
                };
                (h.clone(), text)
            })
            .collect();
        rows.push(row);
    }

    debug!("Parsed {} spreadsheet rows", rows.len());
    Ok(SourceTable { headers, rows })
}

/// Render a spreadsheet cell as text
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Render a date-column cell, treating bare numbers as Excel serials
fn date_cell_text(cell: &Data) -> String {
    let serial = match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    };
    match serial.and_then(excel_serial_to_date) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => cell_text(cell),
    }
}

/// Convert an Excel serial day number to a date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    // 2958465 is 9999-12-31, the last date Excel can represent
    if !serial.is_finite() || !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Slice off the first `n` physical lines
fn skip_lines(bytes: &[u8], n: usize) -> &[u8] {
    let mut rest = bytes;
    for _ in 0..n {
        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return &[],
        }
    }
    rest
}

/// Parse a date string in various common formats
///
/// Returns None instead of failing; an unreadable date never drops a row.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Two-digit years first: %Y would happily read "24" as year 24
    let formats = [
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
        "%Y-%m-%d", // 2024-01-15
        "%d/%m/%y", // 15/01/24
        "%d/%m/%Y", // 15/01/2024
        "%d-%m-%Y", // 15-01-2024
        "%Y/%m/%d", // 2024/01/15
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Largest accepted transaction magnitude
///
/// Sums over any realistic batch of amounts within this bound stay far
/// inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276447232, 23283, 0, false, 0); // 1e14

/// Parse an amount string, handling currency symbols, commas and
/// parenthesised negatives
///
/// Magnitudes above [`MAX_AMOUNT`] are rejected.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' ', '"'], "")
        .replace('(', "-")
        .replace(')', "");

    if cleaned.is_empty() {
        return Err(Error::Import("Missing amount".into()));
    }

    let amount = cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;

    if amount.abs() > MAX_AMOUNT {
        return Err(Error::Import(format!("Amount out of range: {}", s.trim())));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date() {
        let jan_15 = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date("01/15/2024"), jan_15);
        assert_eq!(parse_date("2024-01-15"), jan_15);
        assert_eq!(parse_date("15/01/2024"), jan_15);
        assert_eq!(parse_date("15-01-2024"), jan_15);
        assert_eq!(parse_date("2024-01-15 00:00:00"), jan_15);
        assert_eq!(parse_date(" 2024-01-15T08:30:00 "), jan_15);
        assert_eq!(parse_date("01/15/24"), jan_15);
        assert_eq!(parse_date("15/01/24"), jan_15);
        assert_eq!(parse_date("2024/01/15"), jan_15);
    }

    #[test]
    fn test_parse_date_month_first_when_ambiguous() {
        assert_eq!(parse_date("03/04/2024"), NaiveDate::from_ymd_opt(2024, 3, 4));
    }

    #[test]
    fn test_parse_date_invalid_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("31/02/2024"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("-123.45").unwrap(), dec!(-123.45));
        assert_eq!(parse_amount("(100.00)").unwrap(), dec!(-100.00));
        assert_eq!(parse_amount("-$50.00").unwrap(), dec!(-50));
        assert_eq!(parse_amount("2500").unwrap(), dec!(2500));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("   ").is_err());
        assert!(parse_amount("n/a").is_err());
    }

    #[test]
    fn test_parse_amount_bounds() {
        assert_eq!(MAX_AMOUNT, dec!(100000000000000));
        assert_eq!(
            parse_amount("-100,000,000,000,000").unwrap(),
            dec!(-100000000000000)
        );
        assert!(parse_amount("100000000000000.01").is_err());
        assert!(parse_amount("79228162514264337593543950335").is_err());
        assert!(parse_amount("(1e20)").is_err());
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(excel_serial_to_date(45667.75), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_skip_lines() {
        let data = b"a\nb\nc\nheader\n";
        assert_eq!(skip_lines(data, 3), b"header\n");
        assert_eq!(skip_lines(data, 0), data);
        assert_eq!(skip_lines(data, 10), b"");
    }

    #[test]
    fn test_parse_delimited_skips_preamble() {
        let csv = "\
Account Name,Everyday
Account Number,12-3456-7890123-00
Date Range,01/01/2024 - 31/01/2024
Opening Balance,1000.00
Closing Balance,954.80
Date,Unique Id,Tran Type,Cheque Number,Payee,Memo,Amount
2024/01/05,1,EFTPOS,,COUNTDOWN QUEEN ST,4835-****-****-1234,-45.20
2024/01/06,2,TFR IN,,Savings,,100.00
";
        let table = SourceFormat::Delimited.parse(csv.as_bytes(), 5).unwrap();
        assert_eq!(
            table.headers,
            vec!["Date", "Unique Id", "Tran Type", "Cheque Number", "Payee", "Memo", "Amount"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Payee"), Some("COUNTDOWN QUEEN ST"));
        assert_eq!(table.rows[0].get("Amount"), Some("-45.20"));
        assert_eq!(table.rows[1].get("Tran Type"), Some("TFR IN"));
    }

    #[test]
    fn test_parse_delimited_short_rows() {
        let csv = "Date,Payee,Amount,Tran Type\n2024-01-05,Cafe,-4.50\n";
        let table = SourceFormat::Delimited.parse(csv.as_bytes(), 0).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("Amount"), Some("-4.50"));
        assert_eq!(table.rows[0].get("Tran Type"), None);
    }

    #[test]
    fn test_parse_delimited_blank_rows_are_blank() {
        let csv = "Date,Payee,Amount\n,,\n2024-01-05,Cafe,-4.50\n";
        let table = SourceFormat::Delimited.parse(csv.as_bytes(), 0).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].is_blank());
        assert!(!table.rows[1].is_blank());
    }

    #[test]
    fn test_parse_spreadsheet_rejects_non_workbook() {
        let result = SourceFormat::Spreadsheet.parse(b"definitely not a workbook", 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_columns() {
        let headers: Vec<String> = ["Transaction Date", "Details", "Type"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            SourceFormat::Spreadsheet.columns().missing_columns(&headers),
            vec!["Amount"]
        );
        assert!(SourceFormat::Delimited
            .columns()
            .missing_columns(&headers)
            .contains(&"Payee".to_string()));
    }

    #[test]
    fn test_raw_row_get_trims() {
        let row: RawRow = [("Details", "  Countdown  "), ("Amount", "")].into_iter().collect();
        assert_eq!(row.get("Details"), Some("Countdown"));
        assert_eq!(row.get("Amount"), Some(""));
        assert_eq!(row.get("Missing"), None);
        assert!(!row.is_blank());
    }
}
