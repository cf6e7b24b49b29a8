//! The authorization engine: submission, confirmation, revocation, and the
//! two-path execute decision.
//!
//! # Architecture
//!
//! ```text
//! submit ──> TransactionLedger ──> confirm/revoke ──> execute
//!                                                        │
//!                          ┌─────────────────────────────┤
//!                          v                             v
//!                  threshold + timelock          daily-limit reserve
//!                          │                             │
//!                          └──────> settlement <─────────┘
//!                                       │
//!                              ok: mark executed
//!                              err: stay retryable
//! ```
//!
//! Either authorization path is sufficient on its own: full consensus plus
//! an elapsed timelock, or capacity in the rolling daily window. A
//! threshold-path execution never consumes daily-limit capacity, and the
//! settle-then-mark ordering guarantees a failed settlement leaves the
//! transaction re-executable.
//!
//! Every operation takes the caller identity (pre-authenticated by the
//! embedder) and the current time, so clocks are injectable and the engine
//! performs membership checks only.

pub mod service;


use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, WalletConfig};
use crate::error::WalletError;
use crate::events::{EventSink, NullSink, WalletEvent};
use crate::ledger::{Transaction, TransactionLedger, TxId, TxState};
use crate::limit::DailyLimitTracker;
use crate::owners::OwnerRegistry;
use crate::settlement::{SettlementBackend, SettlementFailure, SettlementRequest};

/// The execute decision, kept as a tagged value so it can be audited and
/// tested apart from settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    /// Confirmations at or above the threshold and the timelock elapsed.
    Threshold,
    /// The transfer fits in the rolling daily window.
    DailyLimit,
    /// Neither path qualifies right now; retry later.
    Denied,
}

impl Authorization {
    /// Returns `true` unless the decision is [`Authorization::Denied`].
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// The path that actually authorized an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPath {
    /// Full consensus with the timelock elapsed.
    Threshold,
    /// Rolling daily-limit bypass.
    DailyLimit,
}

/// Outcome of a successful execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// The executed transaction.
    pub id: TxId,
    /// Which path authorized it.
    pub path: ExecutionPath,
}

/// An authorized execution whose settlement is still pending.
///
/// Produced by [`AuthorizationEngine::begin_execution`]; the caller performs
/// the settlement and reports the result to
/// [`AuthorizationEngine::finish_execution`]. A grant on the daily-limit
/// path holds a window reservation until it is finished.
#[derive(Debug, Clone)]
pub struct ExecutionGrant {
    /// The transaction being executed.
    pub id: TxId,
    /// The owner that triggered execution.
    pub caller: String,
    /// The path that authorized it.
    pub path: ExecutionPath,
    /// What to hand to the settlement collaborator.
    pub request: SettlementRequest,
}

/// Multi-owner approval state machine gating transfers behind an N-of-M
/// threshold, a post-confirmation timelock, per-transaction expiration, and
/// a rolling daily spending cap.
///
/// The engine is a pure in-memory state machine: durability and value
/// movement are collaborator concerns. It is single-threaded by design;
/// concurrent embedders serialize through [`service::WalletService`].
///
/// # Example
///
/// ```rust
/// use covault_core::config::WalletConfig;
/// use covault_core::engine::AuthorizationEngine;
/// use covault_core::settlement::{SettlementBackend, SettlementRequest, SettlementFailure};
///
/// struct AlwaysOk;
/// impl SettlementBackend for AlwaysOk {
///     fn transfer(&self, _request: &SettlementRequest) -> Result<(), SettlementFailure> {
///         Ok(())
///     }
/// }
///
/// let config = WalletConfig {
///     owners: vec!["owner-1".into(), "owner-2".into(), "owner-3".into()],
///     required_confirmations: 2,
///     time_lock_secs: 60,
///     daily_limit: 1_000_000_000,
/// };
/// let mut engine = AuthorizationEngine::new(&config).unwrap();
///
/// // A small transfer rides the daily-limit path with no confirmations.
/// let id = engine
///     .submit("owner-1", "recipient".into(), 100_000_000, vec![], None, 0)
///     .unwrap();
/// let outcome = engine.execute("owner-1", id, 0, &AlwaysOk).unwrap();
/// assert_eq!(outcome.id, id);
/// ```
pub struct AuthorizationEngine {
    registry: OwnerRegistry,
    ledger: TransactionLedger,
    limit: DailyLimitTracker,
    time_lock_secs: u64,
    sink: Box<dyn EventSink>,
}

impl std::fmt::Debug for AuthorizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationEngine")
            .field("registry", &self.registry)
            .field("transactions", &self.ledger.len())
            .field("time_lock_secs", &self.time_lock_secs)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl AuthorizationEngine {
    /// Builds an engine from a validated configuration, with no event sink
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] if the owner set or
    /// threshold is invalid.
    pub fn new(config: &WalletConfig) -> Result<Self, ConfigError> {
        let registry =
            OwnerRegistry::new(config.owners.clone(), config.required_confirmations)?;
        let required = registry.required_confirmations();
        Ok(Self {
            registry,
            ledger: TransactionLedger::new(required),
            limit: DailyLimitTracker::new(config.daily_limit),
            time_lock_secs: config.time_lock_secs,
            sink: Box::new(NullSink),
        })
    }

    /// Attaches an event sink. Replaces any previously attached sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The owner registry.
    #[must_use]
    pub const fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// Capacity left in the rolling daily window at `now`.
    #[must_use]
    pub fn daily_remaining(&self, now: u64) -> u64 {
        self.limit.remaining(now)
    }

    /// Looks up a transaction by id.
    #[must_use]
    pub fn transaction(&self, id: TxId) -> Option<&Transaction> {
        self.ledger.get(id)
    }

    /// Derives the lifecycle state of transaction `id` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotFound`] if the id is unknown.
    pub fn state_of(&self, id: TxId, now: u64) -> Result<TxState, WalletError> {
        self.ledger
            .get(id)
            .map(|tx| {
                tx.state(
                    self.registry.required_confirmations(),
                    self.time_lock_secs,
                    now,
                )
            })
            .ok_or(WalletError::NotFound { id })
    }

    /// Proposes a transfer. The submitter is not auto-confirmed: every
    /// confirmation, including the submitter's, is an explicit `confirm`.
    ///
    /// # Errors
    ///
    /// - [`WalletError::Unauthorized`] if `caller` is not an owner
    /// - [`WalletError::InvalidExpiration`] if the deadline is not in the
    ///   future (pass `None` for "never expires")
    pub fn submit(
        &mut self,
        caller: &str,
        destination: String,
        value: u64,
        payload: Vec<u8>,
        expires_at: Option<u64>,
        now: u64,
    ) -> Result<TxId, WalletError> {
        self.check_owner(caller)?;
        if let Some(deadline) = expires_at {
            if deadline <= now {
                return Err(WalletError::InvalidExpiration {
                    expires_at: deadline,
                    now,
                });
            }
        }

        let id = self.ledger.insert(destination, value, payload, expires_at);
        self.sink.emit(&WalletEvent::Submitted {
            id,
            owner: caller.to_string(),
            timestamp: now,
        });
        Ok(id)
    }

    /// Adds the caller's confirmation to transaction `id`.
    ///
    /// # Errors
    ///
    /// [`WalletError::Unauthorized`], [`WalletError::NotFound`], or the
    /// ledger's failures surfaced unchanged ([`WalletError::AlreadyConfirmed`],
    /// [`WalletError::Expired`], [`WalletError::AlreadyExecuted`]).
    pub fn confirm(&mut self, caller: &str, id: TxId, now: u64) -> Result<(), WalletError> {
        self.check_owner(caller)?;
        self.check_known(id)?;
        self.note_expiry(id, now);

        let confirmations = self.ledger.confirm(id, caller, now)?;
        self.sink.emit(&WalletEvent::Confirmed {
            id,
            owner: caller.to_string(),
            confirmations,
            timestamp: now,
        });
        Ok(())
    }

    /// Withdraws the caller's confirmation from transaction `id`.
    ///
    /// # Errors
    ///
    /// [`WalletError::Unauthorized`], [`WalletError::NotFound`], or the
    /// ledger's failures surfaced unchanged ([`WalletError::NotConfirmed`],
    /// [`WalletError::Expired`], [`WalletError::AlreadyExecuted`]).
    pub fn revoke(&mut self, caller: &str, id: TxId, now: u64) -> Result<(), WalletError> {
        self.check_owner(caller)?;
        self.check_known(id)?;
        self.note_expiry(id, now);

        let confirmations = self.ledger.revoke(id, caller, now)?;
        self.sink.emit(&WalletEvent::Revoked {
            id,
            owner: caller.to_string(),
            confirmations,
            timestamp: now,
        });
        Ok(())
    }

    /// Evaluates the execute decision for transaction `id` at `now` without
    /// reserving anything or touching state.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotFound`] if the id is unknown. Terminal
    /// states are reported through the decision, not as errors.
    pub fn probe_authorization(&self, id: TxId, now: u64) -> Result<Authorization, WalletError> {
        let tx = self.ledger.get(id).ok_or(WalletError::NotFound { id })?;
        if tx.executed || tx.is_expired_at(now) {
            return Ok(Authorization::Denied);
        }
        Ok(Self::decide(
            tx,
            self.registry.required_confirmations(),
            self.time_lock_secs,
            self.limit.remaining(now),
            now,
        ))
    }

    /// Authorizes an execution and reserves daily-limit capacity if that is
    /// the path taken. The caller must settle the returned request and
    /// report the result to [`AuthorizationEngine::finish_execution`].
    ///
    /// # Errors
    ///
    /// - [`WalletError::Unauthorized`] if `caller` is not an owner
    /// - [`WalletError::NotFound`] if the id is unknown
    /// - [`WalletError::AlreadyExecuted`] / [`WalletError::Expired`] for
    ///   terminal transactions
    /// - [`WalletError::NotAuthorized`] if neither path qualifies
    pub fn begin_execution(
        &mut self,
        caller: &str,
        id: TxId,
        now: u64,
    ) -> Result<ExecutionGrant, WalletError> {
        self.check_owner(caller)?;
        self.check_known(id)?;
        self.note_expiry(id, now);

        let required = self.registry.required_confirmations();
        let time_lock = self.time_lock_secs;
        let remaining = self.limit.remaining(now);

        let tx = self.ledger.get(id).ok_or(WalletError::NotFound { id })?;
        if tx.executed {
            return Err(WalletError::AlreadyExecuted { id });
        }
        if tx.is_expired_at(now) {
            return Err(WalletError::Expired {
                id,
                expired_at: tx.expires_at.unwrap_or(now),
            });
        }

        let path = match Self::decide(tx, required, time_lock, remaining, now) {
            Authorization::Threshold => ExecutionPath::Threshold,
            Authorization::DailyLimit => ExecutionPath::DailyLimit,
            Authorization::Denied => return Err(WalletError::NotAuthorized { id }),
        };

        let request = SettlementRequest {
            destination: tx.destination.clone(),
            value: tx.value,
            payload: tx.payload.clone(),
            idempotency_key: id,
        };

        if path == ExecutionPath::DailyLimit {
            // Cannot fail: the decision already checked remaining capacity,
            // and nothing else ran between the check and the reserve.
            let reserved = self.limit.try_reserve(now, request.value);
            debug_assert!(reserved);
        }

        Ok(ExecutionGrant {
            id,
            caller: caller.to_string(),
            path,
            request,
        })
    }

    /// Applies the settlement result for a grant.
    ///
    /// On success the transaction is marked executed (settle, then mark: a
    /// failed settlement must leave the transaction retryable). On failure a
    /// daily-limit reservation is rolled back and the transaction stays
    /// non-executed.
    ///
    /// # Errors
    ///
    /// - [`WalletError::SettlementFailed`] when the backend reported failure
    /// - [`WalletError::AlreadyExecuted`] if the grant's transaction was
    ///   somehow already recorded (engine misuse; the serialized service
    ///   never produces this)
    pub fn finish_execution(
        &mut self,
        grant: &ExecutionGrant,
        settled: Result<(), SettlementFailure>,
        now: u64,
    ) -> Result<ExecutionOutcome, WalletError> {
        match settled {
            Ok(()) => {
                self.ledger.mark_executed(grant.id)?;
                self.sink.emit(&WalletEvent::Executed {
                    id: grant.id,
                    owner: grant.caller.clone(),
                    path: grant.path,
                    timestamp: now,
                });
                Ok(ExecutionOutcome {
                    id: grant.id,
                    path: grant.path,
                })
            },
            Err(failure) => {
                if grant.path == ExecutionPath::DailyLimit {
                    self.limit.release(grant.request.value);
                }
                self.sink.emit(&WalletEvent::SettlementFailed {
                    id: grant.id,
                    reason: failure.reason.clone(),
                    timestamp: now,
                });
                Err(WalletError::SettlementFailed {
                    id: grant.id,
                    reason: failure.reason,
                })
            },
        }
    }

    /// Executes transaction `id` against a synchronous settlement backend:
    /// [`AuthorizationEngine::begin_execution`], the transfer, then
    /// [`AuthorizationEngine::finish_execution`] in one call.
    ///
    /// # Errors
    ///
    /// Everything `begin_execution` returns, plus
    /// [`WalletError::SettlementFailed`] when the backend fails.
    pub fn execute<B: SettlementBackend>(
        &mut self,
        caller: &str,
        id: TxId,
        now: u64,
        backend: &B,
    ) -> Result<ExecutionOutcome, WalletError> {
        let grant = self.begin_execution(caller, id, now)?;
        let settled = backend.transfer(&grant.request);
        self.finish_execution(&grant, settled, now)
    }

    /// The two-path decision. Threshold wins when both qualify, so
    /// full-consensus transfers never consume daily-limit capacity.
    fn decide(
        tx: &Transaction,
        required: usize,
        time_lock_secs: u64,
        daily_remaining: u64,
        now: u64,
    ) -> Authorization {
        if tx.threshold_satisfied(required, time_lock_secs, now) {
            Authorization::Threshold
        } else if tx.value <= daily_remaining {
            Authorization::DailyLimit
        } else {
            Authorization::Denied
        }
    }

    fn check_owner(&self, caller: &str) -> Result<(), WalletError> {
        if self.registry.is_owner(caller) {
            Ok(())
        } else {
            Err(WalletError::Unauthorized {
                owner: caller.to_string(),
            })
        }
    }

    fn check_known(&self, id: TxId) -> Result<(), WalletError> {
        if self.ledger.get(id).is_some() {
            Ok(())
        } else {
            Err(WalletError::NotFound { id })
        }
    }

    /// Surfaces a newly observed expiry to the sink, exactly once per
    /// transaction.
    fn note_expiry(&mut self, id: TxId, now: u64) {
        if self.ledger.observe_expiry(id, now) {
            self.sink
                .emit(&WalletEvent::Expired { id, timestamp: now });
        }
    }
}
