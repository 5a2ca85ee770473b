//! Integration tests for spendlens-core
//!
//! These tests exercise the full upload → classify → report → export workflow.

use std::fs;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use spendlens_core::{
    append_summary, export_transactions_csv, Classification, Config, CsvSheet, DiagnosticKind,
    IngestOutcome, KindFilter, Pipeline, SheetSummary, SpendingSummary, SummarySink,
    TransactionFilter, Upload,
};

/// Delimited export with the five-line account preamble banks put above the
/// header
fn delimited_statement() -> &'static str {
    r#"Account Name,Everyday
Account Number,12-3456-7890123-00
Date Range,01/01/2024 - 29/02/2024
Opening Balance,1000.00
Closing Balance,2356.00
Date,Unique Id,Tran Type,Cheque Number,Payee,Memo,Amount
2024/01/05,1,EFTPOS,,COUNTDOWN QUEEN ST,4835-****-****-1234,-45.20
2024/01/06,2,TFR OUT,,Savings Account,,-200.00
2024/01/07,3,TFR IN,,Savings Account,,50.00
2024/01/25,4,Deposit,,Employer Ltd,Salary,2500.00
2024/02/01,5,Loan Payment,,Home Loan,,-1200.00
2024/02/03,6,Direct Credit,,J SMITH,From Joint Account,300.00
2024/02/09,7,EFTPOS,,Unknown Vendor,,-18.75
,,,,,,
"#
}

fn pipeline() -> Pipeline {
    Pipeline::new(&Config::embedded().expect("embedded config"))
}

fn fixture(name: &str) -> Upload {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Upload::from_path(&path).expect("fixture exists")
}

// =============================================================================
// Ingestion
// =============================================================================

#[test]
fn test_two_row_batch_end_to_end() {
    let upload = Upload::new(
        "jan.csv",
        "\n\n\n\n\nDate,Tran Type,Payee,Memo,Amount\n\
         2024-01-05,Payment,Countdown,,-45.20\n\
         2024-01-25,Deposit,Employer,,2500.00\n",
    );

    let report = pipeline().ingest(&[upload]).into_report().expect("processed");
    let categories: Vec<&str> = report.batch.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(categories, vec!["Groceries", "Income"]);

    let summary = SpendingSummary::from_transactions(&report.batch);
    assert_eq!(summary.total_expenses, dec!(45.20));
    assert_eq!(summary.total_income, dec!(2500.00));
    assert_eq!(summary.month_count, 1);
}

#[test]
fn test_delimited_statement_workflow() {
    let upload = Upload::new("everyday.csv", delimited_statement());
    let report = pipeline().ingest(&[upload]).into_report().expect("processed");

    // 7 data rows loaded, the trailing blank row discarded, 2 transfers dropped
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].rows_loaded, 7);
    assert_eq!(report.files[0].rows_rejected, 0);
    assert_eq!(report.transfers_dropped, 2);
    assert_eq!(report.batch.len(), 5);

    let categories: Vec<&str> = report.batch.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(
        categories,
        vec!["Groceries", "Income", "Mortgage", "Income", "Other"]
    );
    assert!(report
        .batch
        .iter()
        .all(|t| !t.transaction_type.starts_with("TFR")));
}

#[test]
fn test_spreadsheet_statement_workflow() {
    let report = pipeline()
        .ingest(&[fixture("statement.xlsx")])
        .into_report()
        .expect("processed");

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.files[0].rows_loaded, 3);
    assert_eq!(report.transfers_dropped, 1);
    assert_eq!(report.batch.len(), 2);

    let groceries = report.batch.get(0).unwrap();
    assert_eq!(groceries.description, "Countdown Queen St");
    assert_eq!(groceries.amount, dec!(-45.2));
    assert_eq!(groceries.month_period, "2024-01");
    assert_eq!(groceries.category, "Groceries");

    let salary = report.batch.get(1).unwrap();
    assert_eq!(salary.memo, "Salary");
    assert_eq!(salary.category, "Income");
    assert_eq!(
        salary.date,
        chrono::NaiveDate::from_ymd_opt(2024, 1, 25)
    );
}

#[test]
fn test_files_concatenate_in_arrival_order() {
    let csv = Upload::new("b.csv", delimited_statement());
    let report = pipeline()
        .ingest(&[fixture("statement.xlsx"), csv])
        .into_report()
        .expect("processed");

    assert_eq!(report.batch.len(), 7);
    assert_eq!(report.batch.get(0).unwrap().source_file, "statement.xlsx");
    assert_eq!(report.batch.get(2).unwrap().source_file, "b.csv");
}

#[test]
fn test_missing_column_file_is_skipped() {
    let good = Upload::new("good.csv", delimited_statement());
    let bad = Upload::new(
        "bad.csv",
        "\n\n\n\n\nDate,Tran Type,Memo,Amount\n2024-01-05,Payment,x,-1.00\n",
    );

    let outcome = pipeline().ingest(&[bad, good]);
    let diagnostics = outcome.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].file, "bad.csv");
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::MissingColumns(vec!["Payee".to_string()])
    );

    let report = outcome.into_report().expect("good file still processed");
    assert_eq!(report.batch.len(), 5);
}

#[test]
fn test_spreadsheet_without_amount_column() {
    let outcome = pipeline().ingest(&[fixture("no_amount.xlsx")]);

    match &outcome {
        IngestOutcome::NothingToProcess { diagnostics } => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].file, "no_amount.xlsx");
            assert_eq!(
                diagnostics[0].kind,
                DiagnosticKind::MissingColumns(vec!["Amount".to_string()])
            );
            assert_eq!(
                diagnostics[0].to_string(),
                "Missing required columns in no_amount.xlsx: Amount"
            );
        }
        IngestOutcome::Processed(_) => panic!("no file should have loaded"),
    }

    // Alongside a good statement only the spreadsheet is skipped
    let outcome = pipeline().ingest(&[
        fixture("no_amount.xlsx"),
        Upload::new("good.csv", delimited_statement()),
    ]);
    assert_eq!(outcome.diagnostics().len(), 1);
    let report = outcome.into_report().expect("good file still processed");
    assert!(report.batch.iter().all(|t| t.source_file == "good.csv"));
    assert_eq!(report.batch.len(), 5);
}

#[test]
fn test_out_of_range_amounts_are_rejected_rows() {
    let upload = Upload::new(
        "huge.csv",
        "\n\n\n\n\nDate,Tran Type,Payee,Memo,Amount\n\
         2024-01-05,Payment,Countdown,,-45.20\n\
         2024-01-06,Payment,Mystery,,79228162514264337593543950335\n\
         2024-01-07,Payment,Mystery,,79228162514264337593543950335\n",
    );

    let report = pipeline().ingest(&[upload]).into_report().expect("processed");
    assert_eq!(report.files[0].rows_loaded, 1);
    assert_eq!(report.files[0].rows_rejected, 2);

    let summary = SpendingSummary::from_transactions(&report.batch);
    assert_eq!(summary.total_expenses, dec!(45.20));
}

#[test]
fn test_all_files_failing_is_nothing_to_process() {
    let outcome = pipeline().ingest(&[
        Upload::new("bad.csv", "\n\n\n\n\nFoo,Bar\n1,2\n"),
        Upload::new("notes.txt", "hello"),
    ]);

    match outcome {
        IngestOutcome::NothingToProcess { diagnostics } => {
            assert_eq!(diagnostics.len(), 2);
            assert_eq!(diagnostics[1].kind, DiagnosticKind::UnsupportedFormat);
        }
        IngestOutcome::Processed(_) => panic!("nothing should have loaded"),
    }
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_sign_invariant() {
    let report = pipeline()
        .ingest(&[Upload::new("everyday.csv", delimited_statement())])
        .into_report()
        .unwrap();

    for t in report.batch.iter() {
        let expected = if t.amount > Decimal::ZERO {
            Classification::Income
        } else {
            Classification::Expense
        };
        assert_eq!(t.classification, expected, "{}", t.description);
    }
}

#[test]
fn test_ingest_is_idempotent() {
    let uploads = [Upload::new("everyday.csv", delimited_statement())];
    let p = pipeline();
    let first = p.ingest(&uploads).into_report().unwrap();
    let second = p.ingest(&uploads).into_report().unwrap();
    assert_eq!(first.batch, second.batch);
}

#[test]
fn test_every_category_is_in_closed_set() {
    let report = pipeline()
        .ingest(&[Upload::new("everyday.csv", delimited_statement())])
        .into_report()
        .unwrap();
    let categories = report.batch.categories();
    assert!(report
        .batch
        .iter()
        .all(|t| categories.iter().any(|c| *c == t.category)));
}

// =============================================================================
// Edits, reports and exports
// =============================================================================

#[test]
fn test_edit_then_report() {
    let mut batch = pipeline()
        .ingest(&[Upload::new("everyday.csv", delimited_statement())])
        .into_report()
        .unwrap()
        .batch;

    // "Unknown Vendor" fell through to Other
    batch.set_category(4, "Dining").unwrap();
    assert!(batch.set_category(4, "Coffee").is_err());
    batch.remove(2).unwrap();

    let summary = SpendingSummary::from_transactions(&batch);
    assert_eq!(summary.total_expenses, dec!(63.95));
    assert_eq!(summary.total_income, dec!(2800.00));
    assert_eq!(summary.month_count, 2);

    let expenses = batch.filtered(&TransactionFilter::new().kind(KindFilter::Expenses));
    assert_eq!(expenses.len(), 2);
}

#[test]
fn test_export_and_sync() {
    let report = pipeline()
        .ingest(&[Upload::new("everyday.csv", delimited_statement())])
        .into_report()
        .unwrap();

    let csv = export_transactions_csv(&report.batch).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.contains("2024-01-05,COUNTDOWN QUEEN ST,4835-****-****-1234,-45.20,EFTPOS,Groceries,everyday.csv"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.csv");
    fs::write(&path, "Total Expenses,Total Income,Mortgage,Groceries,Holiday\n").unwrap();
    let sheet = CsvSheet::open(&path).unwrap();

    let result = append_summary(&sheet, &SheetSummary::from_transactions(&report.batch)).unwrap();
    assert_eq!(result.row_number, 2);
    assert_eq!(
        result.values,
        vec![dec!(1263.95), dec!(2800.00), dec!(1200.00), dec!(45.20), dec!(0)]
    );
    assert_eq!(sheet.header_row().unwrap().len(), 5);
}
