//! Category rule table
//!
//! An ordered mapping from category name to the lowercase keyword substrings
//! that select it. Order matters twice: categories are tried in table order
//! and keywords in list order, so the first hit decides the category.
//!
//! The table is plain data. It is built once from configuration and never
//! mutated while a batch is being classified.

use serde::Serialize;

use crate::error::{Error, Result};

/// Label for deposits and joint-account transfers
pub const INCOME: &str = "Income";
/// Label for loan payments
pub const MORTGAGE: &str = "Mortgage";
/// Fallback label when no rule matches
pub const OTHER: &str = "Other";

/// Synthetic labels appended after the rule-table keys, in display order
pub const SYNTHETIC_CATEGORIES: [&str; 3] = [INCOME, MORTGAGE, OTHER];

/// One rule-table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Ordered category → keywords table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    /// Build a table from ordered `(name, keywords)` pairs
    ///
    /// Keywords are lowercased and blank keywords dropped. Duplicate names and
    /// names that collide with a synthetic label are rejected.
    pub fn new<I, N, K, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules: Vec<CategoryRule> = Vec::new();

        for (name, keywords) in entries {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                return Err(Error::Config("category name cannot be empty".into()));
            }
            if SYNTHETIC_CATEGORIES
                .iter()
                .any(|label| label.eq_ignore_ascii_case(&name))
            {
                return Err(Error::Config(format!(
                    "'{}' is a reserved category name",
                    name
                )));
            }
            if rules.iter().any(|r| r.name == name) {
                return Err(Error::Config(format!("duplicate category: {}", name)));
            }

            let keywords = keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();

            rules.push(CategoryRule { name, keywords });
        }

        Ok(Self { rules })
    }

    /// Every category a transaction can carry: rule keys in table order,
    /// then Income, Mortgage, Other
    pub fn list_categories(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|r| r.name.clone())
            .chain(SYNTHETIC_CATEGORIES.iter().map(|s| s.to_string()))
            .collect()
    }

    /// Whether `name` belongs to the closed category set (exact match)
    pub fn contains(&self, name: &str) -> bool {
        SYNTHETIC_CATEGORIES.contains(&name) || self.rules.iter().any(|r| r.name == name)
    }

    /// Keywords for a rule-table category
    pub fn keywords(&self, name: &str) -> Option<&[String]> {
        self.rules
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.keywords.as_slice())
    }

    /// Rules in match order
    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }

    /// First category with a keyword contained in `haystack`
    ///
    /// `haystack` must already be lowercase.
    pub fn find_match(&self, haystack: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| haystack.contains(k.as_str())))
            .map(|rule| rule.name.as_str())
    }

    /// Number of rule-table categories (synthetic labels excluded)
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
