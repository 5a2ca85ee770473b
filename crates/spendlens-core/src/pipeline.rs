//! Statement ingestion and normalization
//!
//! Turns a set of uploaded statement files into one classified [`Batch`].
//! Each file is handled independently: a file that cannot be read, has the
//! wrong columns or yields no usable rows produces a [`FileDiagnostic`] and
//! the rest of the upload carries on.
//!
//! Rows from every loaded file are concatenated in arrival order, then:
//! 1. internal transfers are dropped
//! 2. dates are parsed (unparseable → None)
//! 3. the month period is derived
//! 4. each row is classified
//! 5. income/expense is derived from the amount sign

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::batch::Batch;
use crate::classify::Classifier;
use crate::config::{Config, IngestConfig};
use crate::error::Result;
use crate::import::{parse_amount, parse_date, SourceTable};
use crate::models::{month_period, Classification, RawTransaction, SourceFormat, Transaction};

/// One uploaded statement file
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Format implied by the file extension
    pub fn format(&self) -> Option<SourceFormat> {
        SourceFormat::from_file_name(&self.name)
    }
}

/// Why a file was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Extension is not a known statement format
    UnsupportedFormat,
    /// Required columns absent from the header row
    MissingColumns(Vec<String>),
    /// Header was fine but no row had a usable amount
    NoUsableRows,
    /// Content could not be parsed at all
    Unreadable(String),
}

/// A per-file problem that did not stop the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiagnostic {
    pub file: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnsupportedFormat => {
                write!(f, "Unsupported file type: {}", self.file)
            }
            DiagnosticKind::MissingColumns(cols) => {
                write!(f, "Missing required columns in {}: {}", self.file, cols.join(", "))
            }
            DiagnosticKind::NoUsableRows => write!(f, "No usable rows in {}", self.file),
            DiagnosticKind::Unreadable(reason) => {
                write!(f, "Could not read {}: {}", self.file, reason)
            }
        }
    }
}

/// Row counts for one successfully loaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub format: SourceFormat,
    /// Rows kept (before transfer filtering)
    pub rows_loaded: usize,
    /// Non-blank rows dropped for an empty or unparseable amount
    pub rows_rejected: usize,
}

/// A classified batch plus what happened to each file
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub batch: Batch,
    pub files: Vec<FileReport>,
    pub diagnostics: Vec<FileDiagnostic>,
    /// Rows dropped as internal transfers
    pub transfers_dropped: usize,
}

/// Result of one ingestion run
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Processed(IngestReport),
    /// No file yielded data; diagnostics say why
    NothingToProcess { diagnostics: Vec<FileDiagnostic> },
}

impl IngestOutcome {
    pub fn diagnostics(&self) -> &[FileDiagnostic] {
        match self {
            Self::Processed(report) => &report.diagnostics,
            Self::NothingToProcess { diagnostics } => diagnostics,
        }
    }

    pub fn report(&self) -> Option<&IngestReport> {
        match self {
            Self::Processed(report) => Some(report),
            Self::NothingToProcess { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<IngestReport> {
        match self {
            Self::Processed(report) => Some(report),
            Self::NothingToProcess { .. } => None,
        }
    }
}

/// Rows loaded from one file
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub report: FileReport,
    pub rows: Vec<RawTransaction>,
}

/// Ingestion pipeline bound to one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: Classifier,
    ingest: IngestConfig,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: Classifier::from_config(config),
            ingest: config.ingest.clone(),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Load, normalize and classify a set of uploads
    pub fn ingest(&self, uploads: &[Upload]) -> IngestOutcome {
        let mut rows = Vec::new();
        let mut files = Vec::new();
        let mut diagnostics = Vec::new();

        for upload in uploads {
            match self.load_file(upload) {
                Ok(loaded) => {
                    info!(
                        "Loaded {} transactions from {}",
                        loaded.report.rows_loaded, upload.name
                    );
                    files.push(loaded.report);
                    rows.extend(loaded.rows);
                }
                Err(diagnostic) => {
                    warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }

        if files.is_empty() {
            return IngestOutcome::NothingToProcess { diagnostics };
        }

        let before = rows.len();
        let transactions: Vec<Transaction> = rows
            .into_iter()
            .filter(|row| !self.ingest.is_transfer(&row.transaction_type))
            .map(|row| self.normalize(row))
            .collect();
        let transfers_dropped = before - transactions.len();
        if transfers_dropped > 0 {
            debug!("Dropped {} internal transfers", transfers_dropped);
        }

        IngestOutcome::Processed(IngestReport {
            batch: Batch::new(transactions, self.classifier.rules()),
            files,
            diagnostics,
            transfers_dropped,
        })
    }

    /// Parse one upload into renamed rows
    pub fn load_file(&self, upload: &Upload) -> std::result::Result<LoadedFile, FileDiagnostic> {
        let diagnostic = |kind| FileDiagnostic {
            file: upload.name.clone(),
            kind,
        };

        let format = upload
            .format()
            .ok_or_else(|| diagnostic(DiagnosticKind::UnsupportedFormat))?;

        let table = format
            .parse(&upload.bytes, self.ingest.preamble_lines)
            .map_err(|e| diagnostic(DiagnosticKind::Unreadable(e.to_string())))?;

        let missing = format.columns().missing_columns(&table.headers);
        if !missing.is_empty() {
            return Err(diagnostic(DiagnosticKind::MissingColumns(missing)));
        }

        let (rows, rows_rejected) = rename_rows(&table, format, &upload.name);
        if rows.is_empty() {
            return Err(diagnostic(DiagnosticKind::NoUsableRows));
        }

        debug!(
            "{}: {} rows as {}, {} rejected",
            upload.name,
            rows.len(),
            format,
            rows_rejected
        );

        Ok(LoadedFile {
            report: FileReport {
                file: upload.name.clone(),
                format,
                rows_loaded: rows.len(),
                rows_rejected,
            },
            rows,
        })
    }

    /// Derive date, period, category and classification for one row
    fn normalize(&self, row: RawTransaction) -> Transaction {
        let date = parse_date(&row.date);
        let category = self
            .classifier
            .classify(&row.description, &row.memo, &row.transaction_type)
            .to_string();

        Transaction {
            date,
            month_period: month_period(date),
            classification: Classification::from_amount(row.amount),
            category,
            description: row.description,
            memo: row.memo,
            amount: row.amount,
            transaction_type: row.transaction_type,
            source_file: row.source_file,
        }
    }
}

/// Map source columns onto canonical fields, skipping blank rows and
/// rejecting rows without a usable amount
fn rename_rows(
    table: &SourceTable,
    format: SourceFormat,
    file: &str,
) -> (Vec<RawTransaction>, usize) {
    let columns = format.columns();
    let mut rows = Vec::new();
    let mut rejected = 0;

    for row in table.rows.iter().filter(|r| !r.is_blank()) {
        let amount_text = row.get(columns.amount).unwrap_or_default();
        let amount = match parse_amount(amount_text) {
            Ok(amount) => amount,
            Err(e) => {
                debug!("{}: skipping row: {}", file, e);
                rejected += 1;
                continue;
            }
        };

        rows.push(RawTransaction {
            date: row.get(columns.date).unwrap_or_default().to_string(),
            description: row.get(columns.description).unwrap_or_default().to_string(),
            memo: row.get(columns.memo).unwrap_or_default().to_string(),
            amount,
            transaction_type: row.get(columns.transaction_type).unwrap_or_default().to_string(),
            source_file: file.to_string(),
        });
    }

    (rows, rejected)
}

/// Ingest with a freshly built pipeline
pub fn ingest(uploads: &[Upload], config: &Config) -> IngestOutcome {
    Pipeline::new(config).ingest(uploads)
}
