//! Observability events and sinks.
//!
//! The engine emits exactly one event per state transition, handed to an
//! [`EventSink`] supplied at construction. Emission is an explicit callback
//! rather than ambient logging, so the engine stays testable with no
//! observability stack attached: tests use [`MemorySink`], embedders that
//! want structured logs use [`TracingSink`], and [`NullSink`] drops
//! everything.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::engine::ExecutionPath;
use crate::ledger::TxId;

/// One state transition of a transaction, as seen by the outside world.
///
/// Every variant carries the transaction id and the caller-supplied
/// timestamp of the operation that caused the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletEvent {
    /// A transfer was proposed.
    Submitted {
        /// The new transaction id.
        id: TxId,
        /// The submitting owner.
        owner: String,
        /// Submission time (Unix seconds).
        timestamp: u64,
    },

    /// An owner confirmed a transaction.
    Confirmed {
        /// The transaction id.
        id: TxId,
        /// The confirming owner.
        owner: String,
        /// Confirmation count after this confirmation.
        confirmations: usize,
        /// Operation time.
        timestamp: u64,
    },

    /// An owner withdrew a confirmation.
    Revoked {
        /// The transaction id.
        id: TxId,
        /// The revoking owner.
        owner: String,
        /// Confirmation count after the revoke.
        confirmations: usize,
        /// Operation time.
        timestamp: u64,
    },

    /// A transaction was settled and recorded. Terminal.
    Executed {
        /// The transaction id.
        id: TxId,
        /// The owner that triggered execution.
        owner: String,
        /// Which authorization path permitted the execution.
        path: ExecutionPath,
        /// Operation time.
        timestamp: u64,
    },

    /// A transaction's deadline was observed to have passed. Terminal;
    /// emitted at most once per transaction.
    Expired {
        /// The transaction id.
        id: TxId,
        /// Observation time.
        timestamp: u64,
    },

    /// The settlement collaborator failed; the transaction remains
    /// retryable.
    SettlementFailed {
        /// The transaction id.
        id: TxId,
        /// The collaborator's failure reason.
        reason: String,
        /// Operation time.
        timestamp: u64,
    },
}

impl WalletEvent {
    /// The transaction this event concerns.
    #[must_use]
    pub const fn tx_id(&self) -> TxId {
        match self {
            Self::Submitted { id, .. }
            | Self::Confirmed { id, .. }
            | Self::Revoked { id, .. }
            | Self::Executed { id, .. }
            | Self::Expired { id, .. }
            | Self::SettlementFailed { id, .. } => *id,
        }
    }

    /// The caller-supplied timestamp of the operation.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        match self {
            Self::Submitted { timestamp, .. }
            | Self::Confirmed { timestamp, .. }
            | Self::Revoked { timestamp, .. }
            | Self::Executed { timestamp, .. }
            | Self::Expired { timestamp, .. }
            | Self::SettlementFailed { timestamp, .. } => *timestamp,
        }
    }

    /// Stable identifier for the transition kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Confirmed { .. } => "confirmed",
            Self::Revoked { .. } => "revoked",
            Self::Executed { .. } => "executed",
            Self::Expired { .. } => "expired",
            Self::SettlementFailed { .. } => "settlement_failed",
        }
    }
}

/// Consumer of wallet events.
///
/// Implementations must not fail: observability is best-effort and never
/// influences engine state.
pub trait EventSink: Send + Sync {
    /// Receives one event per state transition, in transition order.
    fn emit(&self, event: &WalletEvent);
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: &WalletEvent) {
        (**self).emit(event);
    }
}

/// Sink that drops every event. The default when none is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &WalletEvent) {}
}

/// Sink that records events in memory, for tests and inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<WalletEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all events recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<WalletEvent> {
        self.events.lock().expect("event sink mutex poisoned").clone()
    }

    /// Drains and returns all recorded events.
    pub fn take(&self) -> Vec<WalletEvent> {
        std::mem::take(&mut *self.events.lock().expect("event sink mutex poisoned"))
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &WalletEvent) {
        self.events
            .lock()
            .expect("event sink mutex poisoned")
            .push(event.clone());
    }
}

/// Sink that renders each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &WalletEvent) {
        let detail = serde_json::to_string(event).unwrap_or_else(|_| event.kind().to_string());
        tracing::info!(
            target: "covault::events",
            kind = event.kind(),
            tx_id = event.tx_id(),
            timestamp = event.timestamp(),
            %detail,
            "wallet event"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(&WalletEvent::Submitted {
            id: 0,
            owner: "a".to_string(),
            timestamp: 1,
        });
        sink.emit(&WalletEvent::Expired {
            id: 0,
            timestamp: 2,
        });

        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), "submitted");
        assert_eq!(events[1].kind(), "expired");
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn test_event_accessors() {
        let event = WalletEvent::SettlementFailed {
            id: 9,
            reason: "unreachable".to_string(),
            timestamp: 77,
        };
        assert_eq!(event.tx_id(), 9);
        assert_eq!(event.timestamp(), 77);
        assert_eq!(event.kind(), "settlement_failed");
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = WalletEvent::Executed {
            id: 3,
            owner: "owner-1".to_string(),
            path: ExecutionPath::DailyLimit,
            timestamp: 42,
        };
        let json = serde_json::to_value(&event).expect("serializable");
        assert_eq!(json["kind"], "executed");
        assert_eq!(json["id"], 3);
        assert_eq!(json["owner"], "owner-1");
        assert_eq!(json["timestamp"], 42);
    }

    #[test]
    fn test_sink_is_object_safe() {
        let sink: Arc<dyn EventSink> = Arc::new(NullSink);
        sink.emit(&WalletEvent::Expired {
            id: 1,
            timestamp: 0,
        });
    }
}
