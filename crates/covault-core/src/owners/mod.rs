//! Owner registry: the immutable set of authorized identities and the
//! confirmation threshold.
//!
//! The registry is fixed at engine construction time. There are no add or
//! remove operations; changing the owner set means building a new engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Immutable set of owner identities plus the N-of-M confirmation threshold.
///
/// Invariants enforced at construction:
/// - the owner set is non-empty and contains no duplicates
/// - `1 <= required_confirmations <= owner_count`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRegistry {
    /// Owner identities in registration order.
    owners: Vec<String>,
    /// Number of distinct confirmations required for the threshold path.
    required_confirmations: usize,
}

impl OwnerRegistry {
    /// Builds a registry, validating the owner set and threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] if the owner set is
    /// empty, contains duplicates or empty identities, or if
    /// `required_confirmations` is outside `[1, owner_count]`.
    pub fn new(owners: Vec<String>, required_confirmations: usize) -> Result<Self, ConfigError> {
        if owners.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "owner set must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if owner.is_empty() {
                return Err(ConfigError::InvalidConfiguration(
                    "owner identity must not be empty".to_string(),
                ));
            }
            if !seen.insert(owner.as_str()) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "duplicate owner identity: {owner}"
                )));
            }
        }

        if required_confirmations == 0 || required_confirmations > owners.len() {
            return Err(ConfigError::InvalidConfiguration(format!(
                "required_confirmations must be in [1, {}], got {}",
                owners.len(),
                required_confirmations
            )));
        }

        Ok(Self {
            owners,
            required_confirmations,
        })
    }

    /// Returns `true` if the identity is a registered owner.
    #[must_use]
    pub fn is_owner(&self, identity: &str) -> bool {
        self.owners.iter().any(|o| o == identity)
    }

    /// Number of distinct confirmations required for the threshold path.
    #[must_use]
    pub const fn required_confirmations(&self) -> usize {
        self.required_confirmations
    }

    /// Number of registered owners.
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Owner identities in registration order.
    #[must_use]
    pub fn owners(&self) -> &[String] {
        &self.owners
    }
}
