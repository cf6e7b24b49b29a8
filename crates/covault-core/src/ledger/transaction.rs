//! A single proposed transfer and its lifecycle state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::TxId;

/// Lifecycle state of a transaction, derived from its fields at a given
/// instant.
///
/// ```text
/// Pending --confirm--> Confirming --threshold--> Ready --timelock--> Executable
///    |                     |                       |                     |
///    +----------- now >= expires_at -----------> Expired                 |
///                                                                        v
///                                                                    Executed
/// ```
///
/// `Executed` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxState {
    /// No confirmations yet.
    Pending,
    /// At least one confirmation, threshold not reached.
    Confirming,
    /// Threshold reached, timelock still running.
    Ready,
    /// Threshold reached and timelock elapsed.
    Executable,
    /// Settled and recorded. Terminal.
    Executed,
    /// Deadline passed before execution. Terminal.
    Expired,
}

/// A proposed asset transfer awaiting authorization.
///
/// Owned exclusively by the ledger; external callers hold only the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sequence id, assigned at submission.
    pub id: TxId,
    /// Destination handle for the settlement collaborator.
    pub destination: String,
    /// Transfer magnitude in base units.
    pub value: u64,
    /// Opaque payload forwarded to settlement untouched.
    pub payload: Vec<u8>,
    /// Absolute deadline (Unix seconds); `None` means never expires.
    pub expires_at: Option<u64>,
    /// Owners that currently confirm this transaction. Ordered for
    /// deterministic iteration.
    pub confirmed_by: BTreeSet<String>,
    /// Instant the confirmation count first reached the threshold; cleared
    /// if a revoke drops the count back below it.
    pub confirmed_at: Option<u64>,
    /// Whether the transfer was settled and recorded. Monotonic.
    pub executed: bool,
    /// Whether expiry was already surfaced to the observability sink.
    pub(crate) expiry_observed: bool,
}

impl Transaction {
    pub(crate) fn new(
        id: TxId,
        destination: String,
        value: u64,
        payload: Vec<u8>,
        expires_at: Option<u64>,
    ) -> Self {
        Self {
            id,
            destination,
            value,
            payload,
            expires_at,
            confirmed_by: BTreeSet::new(),
            confirmed_at: None,
            executed: false,
            expiry_observed: false,
        }
    }

    /// Number of distinct owners currently confirming.
    #[must_use]
    pub fn confirmation_count(&self) -> usize {
        self.confirmed_by.len()
    }

    /// Returns `true` if `owner` currently confirms this transaction.
    #[must_use]
    pub fn is_confirmed_by(&self, owner: &str) -> bool {
        self.confirmed_by.contains(owner)
    }

    /// Returns `true` if the deadline has passed at `now`. A transaction
    /// with no deadline never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Derives the lifecycle state at `now` for the given threshold and
    /// timelock.
    #[must_use]
    pub fn state(&self, required_confirmations: usize, time_lock_secs: u64, now: u64) -> TxState {
        if self.executed {
            return TxState::Executed;
        }
        if self.is_expired_at(now) {
            return TxState::Expired;
        }
        if self.confirmed_by.len() < required_confirmations {
            if self.confirmed_by.is_empty() {
                TxState::Pending
            } else {
                TxState::Confirming
            }
        } else if self.threshold_satisfied(required_confirmations, time_lock_secs, now) {
            TxState::Executable
        } else {
            TxState::Ready
        }
    }

    /// Threshold-path eligibility: confirmations at or above the threshold
    /// and the timelock elapsed.
    #[must_use]
    pub fn threshold_satisfied(
        &self,
        required_confirmations: usize,
        time_lock_secs: u64,
        now: u64,
    ) -> bool {
        self.confirmed_by.len() >= required_confirmations
            && self
                .confirmed_at
                .is_some_and(|confirmed_at| now >= confirmed_at.saturating_add(time_lock_secs))
    }
}
