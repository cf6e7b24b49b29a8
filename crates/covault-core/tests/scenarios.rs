//! End-to-end scenarios driving the public engine API.
//!
//! Values are denominated in base units: `UNIT` plays the role of one whole
//! coin, so "a transfer of 0.1" is `UNIT / 10`.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use covault_core::{
    AuthorizationEngine, ExecutionPath, MemorySink, SettlementBackend, SettlementFailure,
    SettlementRequest, TxState, WalletConfig, WalletError, expiration_from_sentinel,
};

const UNIT: u64 = 1_000_000_000;
const TIME_LOCK: u64 = 60;

const OWNER_1: &str = "owner-1";
const OWNER_2: &str = "owner-2";
const OWNER_3: &str = "owner-3";

/// 3 owners, 2 confirmations required, 60 s timelock, daily limit of 1 UNIT.
fn standard_config() -> WalletConfig {
    WalletConfig {
        owners: vec![
            OWNER_1.to_string(),
            OWNER_2.to_string(),
            OWNER_3.to_string(),
        ],
        required_confirmations: 2,
        time_lock_secs: TIME_LOCK,
        daily_limit: UNIT,
    }
}

#[derive(Default)]
struct RecordingBackend {
    requests: RefCell<Vec<SettlementRequest>>,
    fail: Cell<bool>,
}

impl SettlementBackend for RecordingBackend {
    fn transfer(&self, request: &SettlementRequest) -> Result<(), SettlementFailure> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail.get() {
            Err(SettlementFailure::new("settlement rejected"))
        } else {
            Ok(())
        }
    }
}

/// Scenario A: a 0.1-unit transfer executes immediately through the
/// daily-limit path with a single confirmation outstanding.
#[test]
fn scenario_a_small_transfer_bypasses_threshold() {
    let mut engine = AuthorizationEngine::new(&standard_config()).unwrap();
    let backend = RecordingBackend::default();

    let id = engine
        .submit(OWNER_1, "recipient".to_string(), UNIT / 10, vec![], None, 0)
        .unwrap();

    engine.confirm(OWNER_2, id, 0).unwrap();
    assert_eq!(engine.transaction(id).unwrap().confirmation_count(), 1);
    assert_eq!(engine.state_of(id, 0).unwrap(), TxState::Confirming);

    let outcome = engine.execute(OWNER_1, id, 0, &backend).unwrap();
    assert_eq!(outcome.path, ExecutionPath::DailyLimit);
    assert_eq!(engine.state_of(id, 0).unwrap(), TxState::Executed);
    assert_eq!(engine.daily_remaining(0), UNIT - UNIT / 10);
}

/// Scenario B: a 0.5-unit transfer with full confirmation waits out the
/// timelock, then executes through the threshold path.
#[test]
fn scenario_b_threshold_path_waits_for_timelock() {
    let mut engine = AuthorizationEngine::new(&standard_config()).unwrap();
    let backend = RecordingBackend::default();

    let id = engine
        .submit(OWNER_1, "recipient".to_string(), UNIT / 2, vec![], None, 0)
        .unwrap();
    engine.confirm(OWNER_2, id, 0).unwrap();
    engine.confirm(OWNER_3, id, 0).unwrap();
    assert_eq!(engine.transaction(id).unwrap().confirmed_at, Some(0));

    // Drain the shared daily window so only the threshold path remains in
    // play for this transfer.
    let filler = engine
        .submit(OWNER_1, "elsewhere".to_string(), UNIT, vec![], None, 0)
        .unwrap();
    engine.execute(OWNER_1, filler, 0, &backend).unwrap();

    assert_eq!(
        engine.execute(OWNER_1, id, 30, &backend).unwrap_err(),
        WalletError::NotAuthorized { id }
    );

    let outcome = engine.execute(OWNER_1, id, 61, &backend).unwrap();
    assert_eq!(outcome.path, ExecutionPath::Threshold);
    // The threshold path leaves the (already drained) window untouched.
    assert_eq!(engine.daily_remaining(61), 0);
}

/// Scenario C: a transfer exceeding the daily limit with too few
/// confirmations is denied outright.
#[test]
fn scenario_c_neither_path_qualifies() {
    let mut engine = AuthorizationEngine::new(&standard_config()).unwrap();
    let backend = RecordingBackend::default();

    let id = engine
        .submit(OWNER_1, "recipient".to_string(), 2 * UNIT, vec![], None, 0)
        .unwrap();
    engine.confirm(OWNER_2, id, 0).unwrap();

    assert_eq!(
        engine.execute(OWNER_1, id, 0, &backend).unwrap_err(),
        WalletError::NotAuthorized { id }
    );
    assert!(backend.requests.borrow().is_empty());
    assert_eq!(engine.state_of(id, 0).unwrap(), TxState::Confirming);
}

/// Scenario D: confirm then revoke drops the count back to zero, and an
/// execute attempt (with the daily window drained) is denied.
#[test]
fn scenario_d_revoked_confirmation_counts_for_nothing() {
    let mut engine = AuthorizationEngine::new(&standard_config()).unwrap();
    let backend = RecordingBackend::default();

    let id = engine
        .submit(OWNER_1, "recipient".to_string(), 2 * UNIT, vec![], None, 0)
        .unwrap();
    engine.confirm(OWNER_2, id, 0).unwrap();
    engine.revoke(OWNER_2, id, 1).unwrap();

    let tx = engine.transaction(id).unwrap();
    assert_eq!(tx.confirmation_count(), 0);
    assert_eq!(tx.confirmed_at, None);

    assert_eq!(
        engine.execute(OWNER_1, id, 2, &backend).unwrap_err(),
        WalletError::NotAuthorized { id }
    );
}

/// The original wallet flow: submit 0.5, a second owner confirms, and the
/// submitter executes once the timelock has elapsed. Events trace the whole
/// lifecycle and the settlement receives exactly one request.
#[test]
fn full_flow_with_events_and_settlement() {
    let sink = Arc::new(MemorySink::new());
    let mut engine = AuthorizationEngine::new(&standard_config())
        .unwrap()
        .with_sink(Box::new(Arc::clone(&sink)));
    let backend = RecordingBackend::default();

    // The legacy surface encodes "never expires" as 0.
    let expires = expiration_from_sentinel(0);
    assert_eq!(expires, None);

    let id = engine
        .submit(OWNER_1, "recipient".to_string(), UNIT / 2, vec![], expires, 100)
        .unwrap();
    engine.confirm(OWNER_1, id, 101).unwrap();
    engine.confirm(OWNER_2, id, 102).unwrap();

    let outcome = engine
        .execute(OWNER_1, id, 102 + TIME_LOCK, &backend)
        .unwrap();
    assert_eq!(outcome.path, ExecutionPath::Threshold);

    let requests = backend.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].destination, "recipient");
    assert_eq!(requests[0].value, UNIT / 2);
    assert_eq!(requests[0].idempotency_key, id);

    let kinds: Vec<&str> = sink.snapshot().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec!["submitted", "confirmed", "confirmed", "executed"]
    );
}

/// A transient settlement failure leaves the transaction retryable and the
/// retry carries identical request contents under the same idempotency key.
#[test]
fn settlement_failure_then_successful_retry() {
    let mut engine = AuthorizationEngine::new(&standard_config()).unwrap();
    let backend = RecordingBackend::default();
    backend.fail.set(true);

    let id = engine
        .submit(OWNER_1, "recipient".to_string(), UNIT / 4, vec![1, 2, 3], None, 0)
        .unwrap();

    assert!(matches!(
        engine.execute(OWNER_1, id, 0, &backend).unwrap_err(),
        WalletError::SettlementFailed { .. }
    ));
    assert_eq!(engine.state_of(id, 0).unwrap(), TxState::Pending);
    assert_eq!(engine.daily_remaining(0), UNIT);

    backend.fail.set(false);
    engine.execute(OWNER_1, id, 10, &backend).unwrap();

    let requests = backend.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
}

/// An expiring transaction dies at its deadline no matter how many
/// confirmations it holds.
#[test]
fn expiration_overrides_full_confirmation() {
    let mut engine = AuthorizationEngine::new(&standard_config()).unwrap();
    let backend = RecordingBackend::default();

    let id = engine
        .submit(
            OWNER_1,
            "recipient".to_string(),
            UNIT / 2,
            vec![],
            Some(50),
            0,
        )
        .unwrap();
    engine.confirm(OWNER_2, id, 1).unwrap();
    engine.confirm(OWNER_3, id, 2).unwrap();

    assert_eq!(
        engine.execute(OWNER_1, id, 50, &backend).unwrap_err(),
        WalletError::Expired { id, expired_at: 50 }
    );
    assert_eq!(engine.state_of(id, 50).unwrap(), TxState::Expired);
    assert!(backend.requests.borrow().is_empty());
}
