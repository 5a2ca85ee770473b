//! Spendlens Core Library
//!
//! Shared functionality for the spendlens statement categorizer:
//! - Category rule table and TOML configuration
//! - Deterministic keyword classifier
//! - Spreadsheet and delimited statement parsers
//! - Ingestion pipeline with per-file diagnostics
//! - Batch editing, reports and filters
//! - CSV and Excel export, summary sheet sync with pluggable sinks

pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod sheets;

pub use batch::Batch;
pub use classify::Classifier;
pub use config::{Config, IngestConfig, Overrides};
pub use error::{Error, Result};
pub use export::{
    export_to_path, export_transactions_csv, write_transactions_csv, write_transactions_xlsx,
    ExportFormat,
};
pub use filter::{KindFilter, TransactionFilter};
pub use models::{Classification, SourceFormat, Transaction};
pub use pipeline::{
    ingest, DiagnosticKind, FileDiagnostic, FileReport, IngestOutcome, IngestReport, Pipeline,
    Upload,
};
pub use report::{CategorySpending, SheetSummary, SpendingSummary, TrendDataPoint};
pub use rules::{CategoryRule, RuleTable};
pub use sheets::{append_summary, CsvSheet, SummarySink, SyncResult};
