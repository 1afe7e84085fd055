//! Ledger settings
//!
//! Settings live in a YAML document under the data directory. A missing
//! document means defaults; a malformed one is a startup error, unlike the
//! ledger document itself, which is user data and recovers by starting
//! empty.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data_paths::DataPaths;
use crate::ledger::reconciler::BALANCE_DECIMALS;
use crate::ledger::store::DEFAULT_APPROVAL_SLA_HOURS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Informational approval window communicated at submission time
    pub approval_sla_hours: i64,
    /// Conversion rate for the secondary display currency
    pub btc_usd_rate: Decimal,
    /// Rounding precision of the reconciled balance
    pub amount_precision: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            approval_sla_hours: DEFAULT_APPROVAL_SLA_HOURS,
            btc_usd_rate: Decimal::from(60_000),
            amount_precision: BALANCE_DECIMALS,
        }
    }
}

impl LedgerConfig {
    /// Load settings from the data directory, defaulting when no settings
    /// file exists
    pub fn load(data_paths: &DataPaths) -> Result<Self> {
        Self::load_from(&data_paths.config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read config: {:?}", path))
            }
        };

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))
    }

    pub fn approval_sla(&self) -> chrono::Duration {
        chrono::Duration::hours(self.approval_sla_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "btc_usd_rate: 72000\n").unwrap();

        let config = LedgerConfig::load_from(&path).unwrap();
        assert_eq!(config.btc_usd_rate, dec!(72000));
        assert_eq!(config.approval_sla_hours, DEFAULT_APPROVAL_SLA_HOURS);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "approval_sla_hours: [not an int\n").unwrap();
        assert!(LedgerConfig::load_from(&path).is_err());
    }
}
