//! Error types shared by the ledger and the authorization engine.

use thiserror::Error;

use crate::ledger::TxId;

/// Errors that can occur during wallet operations.
///
/// Every variant is a synchronous result of the operation that produced it;
/// no error is thrown across the settlement boundary. `SettlementFailed` is
/// transient from the engine's perspective: the transaction remains eligible
/// for a later `execute` retry. `NotAuthorized` is likewise retryable once
/// more confirmations arrive or the timelock elapses. All other variants are
/// permanent rejections for the operation attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WalletError {
    /// The caller is not a registered owner.
    #[error("caller {owner} is not a registered owner")]
    Unauthorized {
        /// The rejected caller identity.
        owner: String,
    },

    /// No transaction exists with this id.
    #[error("transaction not found: {id}")]
    NotFound {
        /// The unknown transaction id.
        id: TxId,
    },

    /// The owner already confirmed this transaction.
    #[error("transaction {id} is already confirmed by {owner}")]
    AlreadyConfirmed {
        /// The transaction id.
        id: TxId,
        /// The owner that already confirmed.
        owner: String,
    },

    /// The owner has no confirmation on this transaction to revoke.
    #[error("transaction {id} has no confirmation from {owner}")]
    NotConfirmed {
        /// The transaction id.
        id: TxId,
        /// The owner attempting the revoke.
        owner: String,
    },

    /// The transaction's deadline has passed. Terminal: no further
    /// confirm/revoke/execute calls are accepted.
    #[error("transaction {id} expired at {expired_at}")]
    Expired {
        /// The transaction id.
        id: TxId,
        /// The deadline that passed (Unix seconds).
        expired_at: u64,
    },

    /// The transaction was already executed. Terminal.
    #[error("transaction {id} is already executed")]
    AlreadyExecuted {
        /// The transaction id.
        id: TxId,
    },

    /// Neither authorization path (threshold + timelock, or daily limit)
    /// permits execution right now.
    #[error("transaction {id} is not authorized for execution")]
    NotAuthorized {
        /// The transaction id.
        id: TxId,
    },

    /// The requested expiration deadline is not in the future.
    #[error("expiration {expires_at} is not after submission time {now}")]
    InvalidExpiration {
        /// The rejected deadline (Unix seconds).
        expires_at: u64,
        /// The submission timestamp.
        now: u64,
    },

    /// The settlement collaborator reported a failure. The transaction
    /// remains non-executed and may be retried.
    #[error("settlement failed for transaction {id}: {reason}")]
    SettlementFailed {
        /// The transaction id.
        id: TxId,
        /// The collaborator's failure reason.
        reason: String,
    },
}
