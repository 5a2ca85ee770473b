//! A classified batch of transactions
//!
//! The batch is the unit every report and export works on. It is owned by
//! the caller and only changes through the edits here: re-categorizing a row
//! within the closed category set, or removing a row.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::TransactionFilter;
use crate::models::Transaction;
use crate::rules::RuleTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Batch {
    transactions: Vec<Transaction>,
    #[serde(skip)]
    categories: Vec<String>,
}

impl Batch {
    /// Wrap classified transactions together with the category set they were
    /// classified against
    pub fn new(transactions: Vec<Transaction>, rules: &RuleTable) -> Self {
        Self {
            transactions,
            categories: rules.list_categories(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Categories an edit may assign
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Transactions matching a filter, in batch order
    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Reassign one transaction's category
    ///
    /// Only labels from the closed category set are accepted.
    pub fn set_category(&mut self, index: usize, category: &str) -> Result<()> {
        if !self.categories.iter().any(|c| c == category) {
            return Err(Error::InvalidCategory(category.to_string()));
        }

        let len = self.transactions.len();
        let txn = self
            .transactions
            .get_mut(index)
            .ok_or_else(|| Error::InvalidData(format!("No transaction at row {} of {}", index, len)))?;

        debug!(
            "Recategorized '{}' from {} to {}",
            txn.description, txn.category, category
        );
        txn.category = category.to_string();
        Ok(())
    }

    /// Drop one transaction from the batch
    pub fn remove(&mut self, index: usize) -> Result<Transaction> {
        if index >= self.transactions.len() {
            return Err(Error::InvalidData(format!(
                "No transaction at row {} of {}",
                index,
                self.transactions.len()
            )));
        }
        Ok(self.transactions.remove(index))
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
