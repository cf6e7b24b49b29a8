//! Transaction ledger: proposed transfers and their confirmation state.
//!
//! The ledger owns every [`Transaction`] exclusively; callers refer to
//! transactions by id only. Ids are assigned strictly increasing from 0 and
//! are never reused. All validation happens before any state is written, so
//! a failed operation leaves the ledger exactly as it found it.

mod transaction;


pub use transaction::{Transaction, TxState};

use crate::error::WalletError;

/// Transaction identifier: a sequence number assigned at submission.
pub type TxId = u64;

/// Maps "raw" expiration deadlines to the internal representation.
///
/// External surfaces that predate this engine encode "never expires" as the
/// zero sentinel; internally the absence of a deadline is `None`.
#[must_use]
pub const fn expiration_from_sentinel(raw: u64) -> Option<u64> {
    if raw == 0 { None } else { Some(raw) }
}

/// The authorization ledger: submitted transactions keyed by sequence id.
///
/// The ledger knows the confirmation threshold so it can stamp and clear
/// `confirmed_at` as the count crosses the boundary; the timelock itself is
/// the engine's concern.
#[derive(Debug, Clone)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
    required_confirmations: usize,
}

impl TransactionLedger {
    /// Creates an empty ledger for the given confirmation threshold.
    #[must_use]
    pub const fn new(required_confirmations: usize) -> Self {
        Self {
            transactions: Vec::new(),
            required_confirmations,
        }
    }

    /// Number of transactions ever submitted (including terminal ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Returns `true` if nothing was ever submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Inserts a new pending transaction and returns its id.
    ///
    /// Ids are strictly increasing from 0 in submission order.
    pub fn insert(
        &mut self,
        destination: String,
        value: u64,
        payload: Vec<u8>,
        expires_at: Option<u64>,
    ) -> TxId {
        let id = self.transactions.len() as TxId;
        self.transactions
            .push(Transaction::new(id, destination, value, payload, expires_at));
        id
    }

    /// Looks up a transaction by id.
    #[must_use]
    pub fn get(&self, id: TxId) -> Option<&Transaction> {
        self.transactions.get(id as usize)
    }

    /// Adds `owner` to the confirmation set of transaction `id`.
    ///
    /// Stamps `confirmed_at = now` when the count first reaches the
    /// threshold. Returns the new confirmation count.
    ///
    /// # Errors
    ///
    /// - [`WalletError::NotFound`] if the id is unknown
    /// - [`WalletError::AlreadyExecuted`] if the transaction is executed
    /// - [`WalletError::Expired`] if the deadline has passed
    /// - [`WalletError::AlreadyConfirmed`] if `owner` already confirmed
    pub fn confirm(&mut self, id: TxId, owner: &str, now: u64) -> Result<usize, WalletError> {
        let required = self.required_confirmations;
        let tx = self.get_live_mut(id, now)?;

        if tx.is_confirmed_by(owner) {
            return Err(WalletError::AlreadyConfirmed {
                id,
                owner: owner.to_string(),
            });
        }

        tx.confirmed_by.insert(owner.to_string());
        if tx.confirmed_by.len() >= required && tx.confirmed_at.is_none() {
            tx.confirmed_at = Some(now);
        }
        Ok(tx.confirmed_by.len())
    }

    /// Removes `owner` from the confirmation set of transaction `id`.
    ///
    /// Clears `confirmed_at` when the count drops below the threshold, so a
    /// later re-confirmation restarts the timelock from scratch. Returns the
    /// new confirmation count.
    ///
    /// # Errors
    ///
    /// - [`WalletError::NotFound`] if the id is unknown
    /// - [`WalletError::AlreadyExecuted`] if the transaction is executed
    /// - [`WalletError::Expired`] if the deadline has passed
    /// - [`WalletError::NotConfirmed`] if `owner` never confirmed
    pub fn revoke(&mut self, id: TxId, owner: &str, now: u64) -> Result<usize, WalletError> {
        let required = self.required_confirmations;
        let tx = self.get_live_mut(id, now)?;

        if !tx.confirmed_by.remove(owner) {
            return Err(WalletError::NotConfirmed {
                id,
                owner: owner.to_string(),
            });
        }

        if tx.confirmed_by.len() < required {
            tx.confirmed_at = None;
        }
        Ok(tx.confirmed_by.len())
    }

    /// Marks transaction `id` as executed. Monotonic: there is no
    /// un-execute operation.
    ///
    /// Expiry is deliberately not checked here: by the time a settlement
    /// succeeds the value has moved, and the ledger must record that even if
    /// the deadline passed while the settlement was in flight.
    ///
    /// # Errors
    ///
    /// - [`WalletError::NotFound`] if the id is unknown
    /// - [`WalletError::AlreadyExecuted`] if already executed
    pub fn mark_executed(&mut self, id: TxId) -> Result<(), WalletError> {
        let tx = self
            .transactions
            .get_mut(id as usize)
            .ok_or(WalletError::NotFound { id })?;
        if tx.executed {
            return Err(WalletError::AlreadyExecuted { id });
        }
        tx.executed = true;
        Ok(())
    }

    /// Records that the transaction's deadline was observed to have passed.
    ///
    /// Returns `true` only on the first observation for a given transaction,
    /// so the caller can emit the `Expired` event exactly once. Executed
    /// transactions are terminal and never report expiry.
    pub fn observe_expiry(&mut self, id: TxId, now: u64) -> bool {
        match self.transactions.get_mut(id as usize) {
            Some(tx) if !tx.executed && !tx.expiry_observed && tx.is_expired_at(now) => {
                tx.expiry_observed = true;
                true
            },
            _ => false,
        }
    }

    fn get_live_mut(&mut self, id: TxId, now: u64) -> Result<&mut Transaction, WalletError> {
        let tx = self
            .transactions
            .get_mut(id as usize)
            .ok_or(WalletError::NotFound { id })?;
        if tx.executed {
            return Err(WalletError::AlreadyExecuted { id });
        }
        if tx.is_expired_at(now) {
            return Err(WalletError::Expired {
                id,
                // is_expired_at only returns true for a concrete deadline.
                expired_at: tx.expires_at.unwrap_or(now),
            });
        }
        Ok(tx)
    }
}
