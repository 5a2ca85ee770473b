//! Domain models for spendlens

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Month bucket for transactions without a parseable date
pub const UNDATED_PERIOD: &str = "undated";

/// Supported statement shapes, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Workbook export (xlsx, xls, ods); first worksheet is read
    Spreadsheet,
    /// Comma-delimited export with a metadata preamble above the header
    Delimited,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Delimited => "delimited",
        }
    }

    /// Pick the format from a file name's extension
    ///
    /// Returns None for extensions that are not bank statement exports.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Delimited),
            _ => None,
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spreadsheet" | "xlsx" | "excel" => Ok(Self::Spreadsheet),
            "delimited" | "csv" => Ok(Self::Delimited),
            _ => Err(format!("Unknown source format: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Income/expense split derived from the sign of the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Income,
    Expense,
}

impl Classification {
    /// Income iff the amount is strictly positive; zero counts as Expense
    pub fn from_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Income
        } else {
            Self::Expense
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row as read from one uploaded file, after column renaming but before
/// batch-level derivation
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    /// Date cell as text (spreadsheet date cells are pre-rendered ISO)
    pub date: String,
    pub description: String,
    pub memo: String,
    pub amount: Decimal,
    pub transaction_type: String,
    pub source_file: String,
}

/// A canonical, categorized transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// None when the source date could not be parsed
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Secondary descriptive text (empty when the source has none)
    pub memo: String,
    /// Negative = expense, positive = income
    pub amount: Decimal,
    /// Source-provided tag such as "Deposit" (empty when absent)
    pub transaction_type: String,
    /// File this row came from
    pub source_file: String,
    /// "YYYY-MM", or [`UNDATED_PERIOD`]
    pub month_period: String,
    pub category: String,
    pub classification: Classification,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Month bucket for a date
pub fn month_period(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{:04}-{:02}", d.year(), d.month()),
        None => UNDATED_PERIOD.to_string(),
    }
}
