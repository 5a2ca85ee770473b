//! Summary command implementation

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use spendlens_core::report::{category_breakdown, monthly_expenses};
use spendlens_core::{CategorySpending, Config, FileReport, SpendingSummary, TrendDataPoint};

use super::{load_batch, truncate};

/// Everything `summary --json` prints
#[derive(Serialize)]
struct SummaryOutput<'a> {
    files: &'a [FileReport],
    summary: SpendingSummary,
    categories: Vec<CategorySpending>,
    months: Vec<TrendDataPoint>,
}

pub fn cmd_summary(config: &Config, files: &[PathBuf], json: bool) -> Result<()> {
    let report = load_batch(config, files)?;
    let batch = &report.batch;

    let summary = SpendingSummary::from_transactions(batch);
    let categories = category_breakdown(batch);
    let months = monthly_expenses(batch);

    if json {
        let output = SummaryOutput {
            files: &report.files,
            summary,
            categories,
            months,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for file in &report.files {
        print!("✅ Loaded {} transactions from {}", file.rows_loaded, file.file);
        if file.rows_rejected > 0 {
            print!(" ({} rows skipped)", file.rows_rejected);
        }
        println!();
    }
    if report.transfers_dropped > 0 {
        println!("   Ignored {} internal transfers", report.transfers_dropped);
    }

    println!();
    println!("📊 Spending Summary");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total Expenses:   ${:.2}", summary.total_expenses);
    println!("   Total Income:     ${:.2}", summary.total_income);
    println!("   Months:           {}", summary.month_count);
    println!("   Avg Monthly Spend ${:.2}", summary.avg_monthly_spend);
    match &summary.top_category {
        Some(top) => println!("   Top Category:     {} (${:.2})", top.category, top.amount),
        None => println!("   Top Category:     -"),
    }

    if categories.is_empty() {
        println!();
        println!("   No spending found.");
        return Ok(());
    }

    println!();
    println!(
        "   {:25} │ {:>10} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼────────────┼────────┼───────");
    for cat in &categories {
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}% │ {:>5}",
            truncate(&cat.category, 25),
            cat.amount,
            cat.percentage,
            cat.transaction_count
        );
    }

    println!();
    println!("📈 Monthly Spending");
    println!("   ─────────────────────────────────────────────────────────────");
    for point in &months {
        println!(
            "   {:10} │ {:>10.2} │ {:>3} txns",
            point.label, point.amount, point.transaction_count
        );
    }

    Ok(())
}
