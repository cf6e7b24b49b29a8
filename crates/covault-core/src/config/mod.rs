//! Construction-time wallet configuration.
//!
//! The configuration surface is supplied once when the engine is built and
//! is immutable afterward: the owner list, the confirmation threshold, the
//! post-confirmation timelock, and the rolling daily spending limit.
//! Configurations can be parsed from TOML files or strings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::owners::OwnerRegistry;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// I/O error reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration is structurally valid but semantically rejected.
    /// Construction-time and fatal: the engine cannot be built.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Wallet configuration: owners, threshold, timelock, and daily limit.
///
/// Values are denominated in indivisible base units; timestamps and
/// durations are Unix seconds.
///
/// # Example
///
/// ```rust
/// use covault_core::config::WalletConfig;
///
/// let config = WalletConfig::from_toml(
///     r#"
///     owners = ["owner-1", "owner-2", "owner-3"]
///     required_confirmations = 2
///     time_lock_secs = 60
///     daily_limit = 1_000_000_000
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.required_confirmations, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Owner identities. Must be non-empty and duplicate-free.
    pub owners: Vec<String>,

    /// Distinct confirmations required for the threshold path.
    /// Must be in `[1, owners.len()]`.
    pub required_confirmations: usize,

    /// Mandatory delay in seconds between reaching the confirmation
    /// threshold and eligibility for execution. Zero disables the delay.
    #[serde(default)]
    pub time_lock_secs: u64,

    /// Cap on cumulative value executable through the low-confirmation
    /// bypass path within a rolling 24-hour window, in base units. Zero
    /// means the bypass path never authorizes a non-zero transfer.
    #[serde(default)]
    pub daily_limit: u64,
}

impl WalletConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML cannot be
    /// parsed, or validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the owner set and threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] under the same
    /// conditions as [`OwnerRegistry::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        OwnerRegistry::new(self.owners.clone(), self.required_confirmations).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_full() {
        let config = WalletConfig::from_toml(
            r#"
            owners = ["a", "b", "c"]
            required_confirmations = 2
            time_lock_secs = 60
            daily_limit = 1000
            "#,
        )
        .expect("valid config");
        assert_eq!(config.owners.len(), 3);
        assert_eq!(config.required_confirmations, 2);
        assert_eq!(config.time_lock_secs, 60);
        assert_eq!(config.daily_limit, 1000);
    }

    #[test]
    fn test_timelock_and_limit_default_to_zero() {
        let config = WalletConfig::from_toml(
            r#"
            owners = ["a", "b"]
            required_confirmations = 1
            "#,
        )
        .expect("valid config");
        assert_eq!(config.time_lock_secs, 0);
        assert_eq!(config.daily_limit, 0);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = WalletConfig::from_toml(
            r#"
            owners = ["a", "b"]
            required_confirmations = 3
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_duplicate_owner_rejected() {
        let err = WalletConfig::from_toml(
            r#"
            owners = ["a", "a"]
            required_confirmations = 1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = WalletConfig::from_toml("owners = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
