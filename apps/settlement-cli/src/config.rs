//! # Settlement Configuration
//!
//! Seller-side assumptions and batch behaviour for a settlement run.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SETTLEMENT_TAX_RATE=7                                              │
//! │     SETTLEMENT_DEFAULT_COMMISSION=20                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, else                                              │
//! │     ~/.config/settlement/settlement.toml (Linux)                       │
//! │     ~/Library/Application Support/com.seller.settlement/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     6% tax, 3% advertising, 30 storage days, 25% commission            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # settlement.toml
//! [settlement]
//! tax_rate = 6.0
//! advertising_percent = 3.0
//! other_expenses = 0.0
//! storage_days = 30
//!
//! [default_commission]
//! fbw = 25.0
//! fbs = 25.0
//! dbs = 25.0
//! click_and_collect = 25.0
//! express = 25.0
//!
//! [batch]
//! parallel = true
//! include_settlements = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use settlement_core::validation::{validate_options, validate_schedule};
use settlement_core::{CategoryCommissionSchedule, SettlementOptions};

use crate::error::{CliError, CliResult};

const CONFIG_FILE_NAME: &str = "settlement.toml";

// =============================================================================
// Batch Settings
// =============================================================================

/// How a batch is run and what the report contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Settle on the rayon thread pool.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Include every per-sale settlement in the report.
    #[serde(default)]
    pub include_settlements: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            parallel: true,
            include_settlements: false,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete settlement run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Tax, advertising, other expenses, storage days.
    #[serde(default)]
    pub settlement: SettlementOptions,

    /// Schedule for categories missing from the schedules file.
    #[serde(default)]
    pub default_commission: CategoryCommissionSchedule,

    #[serde(default)]
    pub batch: BatchSettings,
}

impl SettlementConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (settlement.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(CliError::Read {
                    path,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Reads and parses one TOML file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading settlement config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Rejects out-of-range rates before any batch runs.
    pub fn validate(&self) -> CliResult<()> {
        validate_options(&self.settlement)?;
        validate_schedule(&self.default_commission)?;
        Ok(())
    }

    /// Applies overrides from a variable lookup.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| -> Option<f64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring non-numeric environment override");
                    None
                }
            }
        };

        if let Some(rate) = number("SETTLEMENT_TAX_RATE") {
            debug!(tax_rate = rate, "Overriding tax rate from environment");
            self.settlement.tax_rate = rate;
        }

        if let Some(percent) = number("SETTLEMENT_ADVERTISING_PERCENT") {
            self.settlement.advertising_percent = percent;
        }

        if let Some(amount) = number("SETTLEMENT_OTHER_EXPENSES") {
            self.settlement.other_expenses = amount;
        }

        if let Some(days) = lookup("SETTLEMENT_STORAGE_DAYS") {
            match days.trim().parse::<u32>() {
                Ok(d) => self.settlement.storage_days = d,
                Err(_) => warn!(value = %days, "Ignoring invalid SETTLEMENT_STORAGE_DAYS"),
            }
        }

        if let Some(parallel) = lookup("SETTLEMENT_PARALLEL") {
            match parallel.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.batch.parallel = true,
                "0" | "false" | "no" | "off" => self.batch.parallel = false,
                _ => warn!(value = %parallel, "Unknown SETTLEMENT_PARALLEL value"),
            }
        }

        if let Some(rate) = number("SETTLEMENT_DEFAULT_COMMISSION") {
            debug!(rate, "Overriding default commission from environment");
            self.default_commission = CategoryCommissionSchedule::uniform(rate);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "seller", "settlement")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SettlementConfig::default();
        assert_eq!(config.settlement, SettlementOptions::default());
        assert_eq!(config.default_commission.fbw, 25.0);
        assert!(config.batch.parallel);
        assert!(!config.batch.include_settlements);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = SettlementConfig::from_toml(
            r#"
            [settlement]
            tax_rate = 7.0
            storage_days = 60

            [default_commission]
            fbw = 20.0
            fbs = 22.0
            dbs = 24.0
            click_and_collect = 24.0
            express = 26.0

            [batch]
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(config.settlement.tax_rate, 7.0);
        assert_eq!(config.settlement.storage_days, 60);
        // Omitted keys keep their defaults
        assert_eq!(config.settlement.advertising_percent, 3.0);
        assert_eq!(config.default_commission.fbs, 22.0);
        assert!(!config.batch.parallel);
        assert!(!config.batch.include_settlements);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = SettlementConfig::from_toml("").unwrap();
        assert_eq!(config, SettlementConfig::default());
    }

    #[test]
    fn test_malformed_toml() {
        let err = SettlementConfig::from_toml("[settlement\ntax_rate = ").unwrap_err();
        assert!(matches!(err, CliError::ConfigParse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SettlementConfig::default();
        config.apply_env_overrides(env(&[
            ("SETTLEMENT_TAX_RATE", "7.5"),
            ("SETTLEMENT_ADVERTISING_PERCENT", "5"),
            ("SETTLEMENT_OTHER_EXPENSES", "12.5"),
            ("SETTLEMENT_STORAGE_DAYS", "14"),
            ("SETTLEMENT_PARALLEL", "off"),
            ("SETTLEMENT_DEFAULT_COMMISSION", "19"),
        ]));

        assert_eq!(config.settlement.tax_rate, 7.5);
        assert_eq!(config.settlement.advertising_percent, 5.0);
        assert_eq!(config.settlement.other_expenses, 12.5);
        assert_eq!(config.settlement.storage_days, 14);
        assert!(!config.batch.parallel);
        assert_eq!(config.default_commission, CategoryCommissionSchedule::uniform(19.0));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = SettlementConfig::default();
        config.apply_env_overrides(env(&[
            ("SETTLEMENT_TAX_RATE", "six"),
            ("SETTLEMENT_STORAGE_DAYS", "-3"),
            ("SETTLEMENT_PARALLEL", "maybe"),
        ]));
        assert_eq!(config, SettlementConfig::default());
    }

    #[test]
    fn test_validation_rejects_out_of_range_rates() {
        let mut config = SettlementConfig::default();
        config.settlement.tax_rate = 120.0;
        assert!(matches!(config.validate(), Err(CliError::InvalidConfig(_))));

        let mut config = SettlementConfig::default();
        config.default_commission.express = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let path = PathBuf::from("/nonexistent/settlement.toml");
        assert!(matches!(
            SettlementConfig::load(Some(path)),
            Err(CliError::Read { .. })
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&SettlementConfig::default()).unwrap();
        assert!(toml_str.contains("[settlement]"));
        assert!(toml_str.contains("[default_commission]"));
        assert!(toml_str.contains("[batch]"));
    }
}
