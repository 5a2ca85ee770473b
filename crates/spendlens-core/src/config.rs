//! Classification and ingestion configuration
//!
//! Everything that varies between deployments lives here: the category rule
//! table, which override rules apply, the delimited-export preamble length
//! and the internal-transfer markers.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/spendlens/config/categories.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::rules::RuleTable;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/categories.toml");

/// Which fixed override rules the classifier applies before keyword matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrides {
    /// Transaction type "deposit" → Income
    pub deposit: bool,
    /// Transaction type "loan payment" → Mortgage
    pub loan_payment: bool,
    /// Memo containing "joint" → Income
    pub joint_memo: bool,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            deposit: true,
            loan_payment: true,
            joint_memo: true,
        }
    }
}

/// Ingestion constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Metadata lines preceding the header row in delimited exports
    pub preamble_lines: usize,
    /// Transaction types marking money moved between the user's own accounts
    pub transfer_types: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            preamble_lines: 5,
            transfer_types: vec!["TFR IN".to_string(), "TFR OUT".to_string()],
        }
    }
}

impl IngestConfig {
    /// Whether a transaction type marks an internal transfer (exact match)
    pub fn is_transfer(&self, transaction_type: &str) -> bool {
        self.transfer_types.iter().any(|t| t == transaction_type)
    }
}

/// Complete configuration for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub rules: RuleTable,
    pub overrides: Overrides,
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration, preferring `path`, then the data-dir override,
    /// then the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) if path.exists() => read_config(path)?,
            Some(path) => {
                return Err(Error::Config(format!(
                    "Rules file not found: {}",
                    path.display()
                )))
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => read_config(&default_path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// The embedded default configuration
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendlens").join("config").join("categories.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Loading rules from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    overrides: Option<RawOverrides>,
    ingest: Option<RawIngest>,
    #[serde(default)]
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawOverrides {
    deposit: Option<bool>,
    loan_payment: Option<bool>,
    joint_memo: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawIngest {
    preamble_lines: Option<usize>,
    transfer_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid rules TOML: {}", e)))?;

    let mut config = Config {
        rules: RuleTable::new(raw.categories.into_iter().map(|c| (c.name, c.keywords)))?,
        ..Default::default()
    };

    if let Some(overrides) = raw.overrides {
        if let Some(deposit) = overrides.deposit {
            config.overrides.deposit = deposit;
        }
        if let Some(loan_payment) = overrides.loan_payment {
            config.overrides.loan_payment = loan_payment;
        }
        if let Some(joint_memo) = overrides.joint_memo {
            config.overrides.joint_memo = joint_memo;
        }
    }

    if let Some(ingest) = raw.ingest {
        if let Some(lines) = ingest.preamble_lines {
            config.ingest.preamble_lines = lines;
        }
        if let Some(types) = ingest.transfer_types {
            config.ingest.transfer_types = types;
        }
    }

    debug!("Loaded {} category rules", config.rules.len());
    Ok(config)
}
