//! Transaction filter builder for narrowing a batch before display or export

use crate::models::Transaction;

/// Which side of the ledger to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    /// Negative amounts only
    Expenses,
    /// Positive amounts only
    Income,
}

impl std::str::FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "expenses" | "expense" => Ok(Self::Expenses),
            "income" => Ok(Self::Income),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

/// Builder for transaction filters
///
/// Empty category and month lists mean "no restriction". Conditions combine
/// with AND.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub categories: Vec<String>,
    pub kind: KindFilter,
    pub months: Vec<String>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only these categories
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn kind(mut self, kind: KindFilter) -> Self {
        self.kind = kind;
        self
    }

    /// Keep only these "YYYY-MM" periods
    pub fn months(mut self, months: Vec<String>) -> Self {
        self.months = months;
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if !self.categories.is_empty() && !self.categories.iter().any(|c| *c == txn.category) {
            return false;
        }

        let kind_ok = match self.kind {
            KindFilter::All => true,
            KindFilter::Expenses => txn.is_expense(),
            KindFilter::Income => txn.is_income(),
        };
        if !kind_ok {
            return false;
        }

        self.months.is_empty() || self.months.iter().any(|m| *m == txn.month_period)
    }
}
