//! Multi-owner wallet authorization engine.
//!
//! `covault-core` is the approval state machine behind a multi-owner wallet:
//! asset transfers are gated behind an N-of-M confirmation threshold, a
//! per-transaction expiration, a mandatory post-confirmation timelock, and a
//! rolling 24-hour spending cap that lets small transfers bypass full
//! confirmation.
//!
//! The engine is a pure in-memory state machine. The embedder supplies
//! caller identity (already authenticated), the current time on every call,
//! and a settlement collaborator that actually moves value; the engine
//! returns success/failure outcomes and emits one event per state
//! transition.
//!
//! # Modules
//!
//! - [`owners`]: immutable owner registry and confirmation threshold
//! - [`limit`]: rolling daily spending cap with lazy window rollover
//! - [`ledger`]: proposed transfers and their confirmation state
//! - [`engine`]: the authorization engine and its serialized async service
//! - [`events`]: per-transition observability events and sinks
//! - [`settlement`]: the value-transfer collaborator contract
//! - [`config`]: construction-time configuration surface
//!
//! # Example
//!
//! ```rust
//! use covault_core::config::WalletConfig;
//! use covault_core::engine::AuthorizationEngine;
//! use covault_core::settlement::{SettlementBackend, SettlementFailure, SettlementRequest};
//!
//! struct NoopSettlement;
//! impl SettlementBackend for NoopSettlement {
//!     fn transfer(&self, _request: &SettlementRequest) -> Result<(), SettlementFailure> {
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WalletConfig {
//!     owners: vec!["alice".into(), "bob".into(), "carol".into()],
//!     required_confirmations: 2,
//!     time_lock_secs: 60,
//!     daily_limit: 0,
//! };
//! let mut engine = AuthorizationEngine::new(&config)?;
//!
//! let id = engine.submit("alice", "dest".into(), 500, vec![], None, 0)?;
//! engine.confirm("bob", id, 0)?;
//! engine.confirm("carol", id, 0)?;
//!
//! // Threshold reached at t=0; the timelock gates execution until t=60.
//! let outcome = engine.execute("alice", id, 60, &NoopSettlement)?;
//! assert_eq!(outcome.id, id);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod limit;
pub mod owners;
pub mod settlement;

pub use config::{ConfigError, WalletConfig};
pub use engine::{
    Authorization, AuthorizationEngine, ExecutionGrant, ExecutionOutcome, ExecutionPath,
    service::WalletService,
};
pub use error::WalletError;
pub use events::{EventSink, MemorySink, NullSink, TracingSink, WalletEvent};
pub use ledger::{Transaction, TransactionLedger, TxId, TxState, expiration_from_sentinel};
pub use limit::{DAILY_WINDOW_SECS, DailyLimitTracker};
pub use owners::OwnerRegistry;
pub use settlement::{Settlement, SettlementBackend, SettlementFailure, SettlementRequest};
