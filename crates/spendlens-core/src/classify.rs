//! Deterministic transaction classifier
//!
//! Decision order (first match wins):
//! 1. transaction type "deposit" → Income
//! 2. transaction type "loan payment" → Mortgage
//! 3. memo mentions "joint" → Income
//! 4. rule-table keyword found in "<description> <memo>"
//! 5. Other
//!
//! Rules 1-3 can be switched off per deployment through [`Overrides`]. A
//! schema without a memo column passes an empty memo, which leaves rule 3
//! inert without any special casing.

use crate::config::{Config, Overrides};
use crate::rules::{RuleTable, INCOME, MORTGAGE, OTHER};

/// Keyword-based classifier bound to one rule table
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleTable,
    overrides: Overrides,
}

impl Classifier {
    pub fn new(rules: RuleTable, overrides: Overrides) -> Self {
        Self { rules, overrides }
    }

    /// Build from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rules.clone(), config.overrides)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Every category this classifier can return
    pub fn list_categories(&self) -> Vec<String> {
        self.rules.list_categories()
    }

    /// Assign a category from a transaction's descriptive fields
    ///
    /// Always returns a member of [`RuleTable::list_categories`].
    pub fn classify(&self, description: &str, memo: &str, transaction_type: &str) -> &str {
        let tran_type = transaction_type.trim();

        if self.overrides.deposit && tran_type.eq_ignore_ascii_case("deposit") {
            return INCOME;
        }

        if self.overrides.loan_payment && tran_type.eq_ignore_ascii_case("loan payment") {
            return MORTGAGE;
        }

        let memo_lower = memo.to_lowercase();
        if self.overrides.joint_memo && memo_lower.contains("joint") {
            return INCOME;
        }

        let haystack = format!("{} {}", description.to_lowercase(), memo_lower);
        self.rules.find_match(&haystack).unwrap_or(OTHER)
    }
}
