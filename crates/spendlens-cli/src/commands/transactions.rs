//! Transaction listing and rule table commands

use std::path::PathBuf;

use anyhow::Result;
use rust_decimal::Decimal;
use spendlens_core::{Classifier, Config, KindFilter, TransactionFilter};

use super::{load_batch, truncate};

pub fn cmd_transactions(
    config: &Config,
    files: &[PathBuf],
    categories: Vec<String>,
    kind: &str,
    months: Vec<String>,
    limit: usize,
) -> Result<()> {
    let kind: KindFilter = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let known = config.rules.list_categories();
    if let Some(unknown) = categories.iter().find(|c| !config.rules.contains(c)) {
        anyhow::bail!(
            "Unknown category: {}. Available: {}",
            unknown,
            known.join(", ")
        );
    }

    let report = load_batch(config, files)?;
    let filter = TransactionFilter::new()
        .categories(categories)
        .kind(kind)
        .months(months);
    let rows = report.batch.filtered(&filter);

    if rows.is_empty() {
        println!("No transactions match the filters.");
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({} of {})", rows.len().min(limit), rows.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in rows.iter().take(limit) {
        let amount_str = colored_amount(tx.amount, 10);
        let date = tx
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "????-??-??".to_string());

        println!(
            "   {} │ {} │ {:14} │ {}",
            date,
            amount_str,
            truncate(&tx.category, 14),
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

/// Right-align an amount in `width` columns, then color it
///
/// Escape codes are added after padding so they never count toward the width.
pub fn colored_amount(amount: Decimal, width: usize) -> String {
    if amount < Decimal::ZERO {
        let plain = format!("${:.2}", amount.abs());
        format!("\x1b[31m{:>width$}\x1b[0m", plain, width = width) // Red for expenses
    } else {
        let plain = format!("+${:.2}", amount);
        format!("\x1b[32m{:>width$}\x1b[0m", plain, width = width) // Green for income
    }
}

pub fn cmd_categories(config: &Config) -> Result<()> {
    println!();
    println!("🏷️  Categories (checked top to bottom)");
    println!("   ─────────────────────────────────────────────────────────────");

    for rule in config.rules.iter() {
        println!("   {:15} {}", rule.name, rule.keywords.join(", "));
    }

    let overrides = &config.overrides;
    println!();
    println!(
        "   {:15} {}",
        "Income",
        match (overrides.deposit, overrides.joint_memo) {
            (true, true) => "type \"Deposit\", memo mentioning \"joint\"",
            (true, false) => "type \"Deposit\"",
            (false, true) => "memo mentioning \"joint\"",
            (false, false) => "(manual only)",
        }
    );
    println!(
        "   {:15} {}",
        "Mortgage",
        if overrides.loan_payment {
            "type \"Loan Payment\""
        } else {
            "(manual only)"
        }
    );
    println!("   {:15} no rule matched", "Other");

    Ok(())
}

pub fn cmd_classify(config: &Config, description: &str, memo: &str, tran_type: &str) -> Result<()> {
    let classifier = Classifier::from_config(config);
    println!("{}", classifier.classify(description, memo, tran_type));
    Ok(())
}
