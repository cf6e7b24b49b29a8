//! Serialized async front-end for concurrent embedders.
//!
//! The engine itself is single-threaded; [`WalletService`] provides the
//! sequential-consistency contract for genuine concurrent callers. All
//! ledger-mutating operations behave as if executed one at a time:
//!
//! - `submit`/`confirm`/`revoke` take the state lock for the duration of
//!   the (non-blocking, in-memory) operation.
//! - `execute` serializes against other executes through a tokio mutex held
//!   across the settlement await, but releases the state lock before
//!   dispatching the settlement. A pending settlement therefore never
//!   stalls unrelated confirmations, while the backend still sees at most
//!   one in-flight settlement per wallet and the at-most-once idempotency
//!   key (the transaction id) covers retries after transient failures.
//!
//! There is no way to cancel a settlement once dispatched; the result, when
//! it arrives, re-enters the serialized path to either mark the transaction
//! executed or leave it retryable.

use std::sync::{Mutex, MutexGuard};

use crate::engine::{AuthorizationEngine, ExecutionOutcome};
use crate::error::WalletError;
use crate::ledger::{TxId, TxState};
use crate::settlement::Settlement;

/// Thread-safe wallet front-end over a serialized [`AuthorizationEngine`].
#[derive(Debug)]
pub struct WalletService<S> {
    engine: Mutex<AuthorizationEngine>,
    execute_gate: tokio::sync::Mutex<()>,
    backend: S,
}

impl<S: Settlement> WalletService<S> {
    /// Wraps an engine and its settlement backend.
    pub fn new(engine: AuthorizationEngine, backend: S) -> Self {
        Self {
            engine: Mutex::new(engine),
            execute_gate: tokio::sync::Mutex::new(()),
            backend,
        }
    }

    /// Proposes a transfer. See [`AuthorizationEngine::submit`].
    ///
    /// # Errors
    ///
    /// Propagates the engine's errors unchanged.
    pub fn submit(
        &self,
        caller: &str,
        destination: String,
        value: u64,
        payload: Vec<u8>,
        expires_at: Option<u64>,
        now: u64,
    ) -> Result<TxId, WalletError> {
        self.lock_engine()
            .submit(caller, destination, value, payload, expires_at, now)
    }

    /// Confirms a transaction. See [`AuthorizationEngine::confirm`].
    ///
    /// # Errors
    ///
    /// Propagates the engine's errors unchanged.
    pub fn confirm(&self, caller: &str, id: TxId, now: u64) -> Result<(), WalletError> {
        self.lock_engine().confirm(caller, id, now)
    }

    /// Revokes a confirmation. See [`AuthorizationEngine::revoke`].
    ///
    /// # Errors
    ///
    /// Propagates the engine's errors unchanged.
    pub fn revoke(&self, caller: &str, id: TxId, now: u64) -> Result<(), WalletError> {
        self.lock_engine().revoke(caller, id, now)
    }

    /// Derives the lifecycle state of a transaction at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotFound`] if the id is unknown.
    pub fn state_of(&self, id: TxId, now: u64) -> Result<TxState, WalletError> {
        self.lock_engine().state_of(id, now)
    }

    /// Capacity left in the rolling daily window at `now`.
    pub fn daily_remaining(&self, now: u64) -> u64 {
        self.lock_engine().daily_remaining(now)
    }

    /// Executes a transaction: authorize under the state lock, settle with
    /// the lock released, then apply the result under the lock again.
    ///
    /// # Errors
    ///
    /// Everything [`AuthorizationEngine::begin_execution`] returns, plus
    /// [`WalletError::SettlementFailed`] when the backend fails.
    pub async fn execute(
        &self,
        caller: &str,
        id: TxId,
        now: u64,
    ) -> Result<ExecutionOutcome, WalletError> {
        // One settlement in flight at a time; confirmations and revocations
        // are not blocked by this gate.
        let _gate = self.execute_gate.lock().await;

        let grant = self.lock_engine().begin_execution(caller, id, now)?;
        let settled = self.backend.transfer(&grant.request).await;
        self.lock_engine().finish_execution(&grant, settled, now)
    }

    fn lock_engine(&self) -> MutexGuard<'_, AuthorizationEngine> {
        // Poisoning means another caller panicked mid-operation; state can
        // no longer be trusted.
        self.engine.lock().expect("wallet engine mutex poisoned")
    }
}
