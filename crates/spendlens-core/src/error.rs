//! Error types for spendlens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
