//! Aggregates over a classified batch
//!
//! Expense figures are always positive magnitudes: a transaction counts as
//! spend only when its amount is negative, and its absolute value is summed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, UNDATED_PERIOD};

/// Spend in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: String,
    pub amount: Decimal,
    /// Share of total spend, 0-100, one decimal place
    pub percentage: Decimal,
    pub transaction_count: usize,
}

/// Spend in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDataPoint {
    /// "YYYY-MM"
    pub period: String,
    /// "Jan 2024"
    pub label: String,
    pub amount: Decimal,
    pub transaction_count: usize,
}

/// Headline numbers for a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub transaction_count: usize,
    pub total_expenses: Decimal,
    pub total_income: Decimal,
    /// Distinct dated months in the batch
    pub month_count: usize,
    pub avg_monthly_spend: Decimal,
    /// Category with the largest spend
    pub top_category: Option<CategorySpending>,
}

impl SpendingSummary {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let txns: Vec<&Transaction> = transactions.into_iter().collect();

        let total_expenses = total_expenses(txns.iter().copied());
        let total_income = total_income(txns.iter().copied());
        let month_count = month_count(txns.iter().copied());
        let avg_monthly_spend = if month_count > 0 {
            (total_expenses / Decimal::from(month_count)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Self {
            transaction_count: txns.len(),
            total_expenses,
            total_income,
            month_count,
            avg_monthly_spend,
            top_category: category_breakdown(txns.iter().copied()).into_iter().next(),
        }
    }
}

/// Sum that clamps at the `Decimal` bounds instead of overflowing
fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// Sum of negative amounts, sign-flipped
pub fn total_expenses<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    saturating_sum(
        transactions
            .into_iter()
            .filter(|t| t.is_expense())
            .map(|t| -t.amount),
    )
}

/// Sum of positive amounts
pub fn total_income<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    saturating_sum(
        transactions
            .into_iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount),
    )
}

/// Distinct dated month periods
///
/// The `undated` bucket is not counted as a month, unlike a plain distinct
/// count over the month column.
pub fn month_count<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> usize {
    let mut months: Vec<&str> = transactions
        .into_iter()
        .map(|t| t.month_period.as_str())
        .filter(|m| *m != UNDATED_PERIOD)
        .collect();
    months.sort_unstable();
    months.dedup();
    months.len()
}

/// Absolute expense amount per category, keyed by name
pub fn expenses_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, (Decimal, usize)> {
    let mut totals: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for t in transactions.into_iter().filter(|t| t.is_expense()) {
        let entry = totals.entry(t.category.clone()).or_default();
        entry.0 = entry.0.saturating_sub(t.amount);
        entry.1 += 1;
    }
    totals
}

/// Per-category spend, largest first
///
/// Ties keep alphabetical order.
pub fn category_breakdown<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<CategorySpending> {
    let totals = expenses_by_category(transactions);
    let grand_total = saturating_sum(totals.values().map(|(amount, _)| *amount));

    let mut rows: Vec<CategorySpending> = totals
        .into_iter()
        .map(|(category, (amount, transaction_count))| {
            let percentage = if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                (amount / grand_total * Decimal::ONE_HUNDRED).round_dp(1)
            };
            CategorySpending {
                category,
                amount,
                percentage,
                transaction_count,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    rows
}

/// Monthly spend in chronological order; undated rows are left out
pub fn monthly_expenses<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<TrendDataPoint> {
    let mut months: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for t in transactions
        .into_iter()
        .filter(|t| t.is_expense() && t.month_period != UNDATED_PERIOD)
    {
        let entry = months.entry(t.month_period.clone()).or_default();
        entry.0 = entry.0.saturating_sub(t.amount);
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(period, (amount, transaction_count))| TrendDataPoint {
            label: month_label(&period),
            period,
            amount,
            transaction_count,
        })
        .collect()
}

/// "2024-01" → "Jan 2024"
fn month_label(period: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", period), "%Y-%m-%d")
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| period.to_string())
}

/// Figures pushed to a summary sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetSummary {
    pub total_expenses: Decimal,
    pub total_income: Decimal,
    /// Category → summed absolute expense amount
    pub categories: BTreeMap<String, Decimal>,
}

impl SheetSummary {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let txns: Vec<&Transaction> = transactions.into_iter().collect();
        Self {
            total_expenses: total_expenses(txns.iter().copied()),
            total_income: total_income(txns.iter().copied()),
            categories: expenses_by_category(txns.iter().copied())
                .into_iter()
                .map(|(category, (amount, _))| (category, amount))
                .collect(),
        }
    }

    /// Value for one sheet column header
    ///
    /// Headers are trimmed and compared case-insensitively; anything that is
    /// neither a total nor a known category is 0.
    pub fn value_for_header(&self, header: &str) -> Decimal {
        let key = header.trim().to_lowercase();
        let value = match key.as_str() {
            "total expenses" => self.total_expenses,
            "total income" => self.total_income,
            _ => self
                .categories
                .iter()
                .find(|(name, _)| name.to_lowercase() == key)
                .map(|(_, amount)| *amount)
                .unwrap_or_default(),
        };
        value.round_dp(2)
    }

    /// One value per header, in header order
    pub fn row_for_headers<S: AsRef<str>>(&self, headers: &[S]) -> Vec<Decimal> {
        headers
            .iter()
            .map(|h| self.value_for_header(h.as_ref()))
            .collect()
    }
}
