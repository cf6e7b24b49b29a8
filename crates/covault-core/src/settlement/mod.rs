//! Settlement collaborator contract.
//!
//! The engine never moves value itself: an authorized execution hands a
//! [`SettlementRequest`] to a backend and records the outcome. Backends must
//! be idempotent per [`SettlementRequest::idempotency_key`] (the transaction
//! id): the engine may retry a transfer after a transient failure, and it
//! guarantees it never issues two requests with different contents under the
//! same key.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::TxId;

/// Everything a backend needs to move value for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Destination handle.
    pub destination: String,
    /// Transfer magnitude in base units.
    pub value: u64,
    /// Opaque payload, forwarded untouched.
    pub payload: Vec<u8>,
    /// At-most-once key: the transaction id.
    pub idempotency_key: TxId,
}

/// A settlement failure reported by the collaborator.
///
/// Transient from the engine's perspective: the transaction stays
/// non-executed and a later `execute` may retry under the same idempotency
/// key. This is a normal result value, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct SettlementFailure {
    /// Human-readable failure reason.
    pub reason: String,
}

impl SettlementFailure {
    /// Creates a failure with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Synchronous settlement backend used by the core engine.
///
/// The engine treats the call as synchronous-with-timeout; backends that
/// talk to slow externals should be driven through the async
/// [`Settlement`] trait and the service layer instead.
pub trait SettlementBackend {
    /// Moves value to the destination, at most once per idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementFailure`] if the transfer could not be applied;
    /// the engine treats this as retryable.
    fn transfer(&self, request: &SettlementRequest) -> Result<(), SettlementFailure>;
}

/// Asynchronous settlement backend used by the service layer.
///
/// Same contract as [`SettlementBackend`]; the returned future is awaited
/// without the engine's state lock held, so confirmations proceed while a
/// settlement is pending.
pub trait Settlement: Send + Sync {
    /// Moves value to the destination, at most once per idempotency key.
    fn transfer(
        &self,
        request: &SettlementRequest,
    ) -> impl Future<Output = Result<(), SettlementFailure>> + Send;
}
