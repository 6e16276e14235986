//! Integration tests for Store observers
//!
//! Covers the two ways to watch a store from the outside: state subscribers,
//! which see every new snapshot, and action observers, which see every
//! dispatched action including the ones fed back by effects.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use statecraft_core::{effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec, SmallVec};
use statecraft_runtime::{Store, StoreConfig};
use statecraft_testing::{RecordingSubscriber, SequentialIdGenerator, init_test_tracing};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TicketAction {
    /// Open a ticket with a generated id
    Open,
    /// Open a ticket, then confirm it from an effect
    OpenAndConfirm,
    /// Ticket confirmed (fed back by an effect)
    Confirmed { id: Uuid },
    /// Close every ticket
    CloseAll,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TicketState {
    open: Vec<Uuid>,
    confirmed: Vec<Uuid>,
}

struct TicketEnvironment {
    ids: Arc<dyn IdGenerator>,
}

struct TicketReducer;

impl Reducer for TicketReducer {
    type State = TicketState;
    type Action = TicketAction;
    type Environment = TicketEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketAction::Open => {
                state.open.push(env.ids.next_id());
                SmallVec::new()
            },
            TicketAction::OpenAndConfirm => {
                let id = env.ids.next_id();
                state.open.push(id);
                smallvec![Effect::future(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some(TicketAction::Confirmed { id })
                })]
            },
            TicketAction::Confirmed { id } => {
                state.confirmed.push(id);
                SmallVec::new()
            },
            TicketAction::CloseAll => {
                state.open.clear();
                SmallVec::new()
            },
        }
    }
}

fn store() -> Store<TicketState, TicketAction, TicketEnvironment, TicketReducer> {
    init_test_tracing();
    let env = TicketEnvironment {
        ids: Arc::new(SequentialIdGenerator::new()),
    };
    Store::new(TicketState::default(), TicketReducer, env)
}

// ============================================================================
// Tests
// ============================================================================

/// Subscribers receive one snapshot per action, in dispatch order
#[tokio::test]
async fn test_recording_subscriber_sees_each_snapshot() {
    let store = store();
    let recorder = RecordingSubscriber::<TicketState>::new();
    store.subscribe(recorder.clone());

    store.send(TicketAction::Open).await.unwrap();
    store.send(TicketAction::Open).await.unwrap();
    store.send(TicketAction::CloseAll).await.unwrap();

    let open_counts: Vec<_> = recorder.snapshots().iter().map(|s| s.open.len()).collect();
    assert_eq!(open_counts, vec![1, 2, 0]);
    assert_eq!(recorder.last(), Some(store.snapshot().await));
}

/// Ids come from the environment, so a sequential generator makes them predictable
#[tokio::test]
async fn test_environment_ids_are_deterministic() {
    let store = store();

    store.send(TicketAction::Open).await.unwrap();
    store.send(TicketAction::Open).await.unwrap();

    let open = store.state(|s| s.open.clone()).await;
    assert_eq!(open, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
}

/// Several subscribers are notified in registration order for every action
#[tokio::test]
async fn test_multiple_recorders_agree() {
    let store = store();
    let first = RecordingSubscriber::<TicketState>::new();
    let second = RecordingSubscriber::<TicketState>::new();
    store.subscribe(first.clone());
    store.subscribe(second.clone());

    for _ in 0..5 {
        store.send(TicketAction::Open).await.unwrap();
    }

    assert_eq!(first.len(), 5);
    assert_eq!(first.snapshots(), second.snapshots());
    assert_eq!(store.subscriber_count(), 2);
}

/// Action observers see dispatched actions and effect feedback alike
#[tokio::test]
async fn test_action_observer_sees_effect_feedback() {
    let store = store();
    let mut rx = store.subscribe_actions();

    store.send(TicketAction::OpenAndConfirm).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first, TicketAction::OpenAndConfirm);

    let second = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("effect should feed an action back")
        .unwrap();
    assert_eq!(
        second,
        TicketAction::Confirmed {
            id: Uuid::from_u128(1)
        }
    );

    let state = store.snapshot().await;
    assert_eq!(state.confirmed, vec![Uuid::from_u128(1)]);
}

/// Subscribing after the fact only sees later actions
#[tokio::test]
async fn test_late_observer_misses_earlier_actions() {
    let store = store();
    store.send(TicketAction::Open).await.unwrap();

    let mut rx = store.subscribe_actions();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    store.send(TicketAction::CloseAll).await.unwrap();
    assert_eq!(rx.try_recv().unwrap(), TicketAction::CloseAll);
}

/// A slow observer lags instead of blocking dispatch
#[tokio::test]
async fn test_slow_observer_lags() {
    init_test_tracing();
    let env = TicketEnvironment {
        ids: Arc::new(SequentialIdGenerator::new()),
    };
    let config = StoreConfig::default().with_action_broadcast_capacity(2);
    let store = Store::with_config(TicketState::default(), TicketReducer, env, config);
    let mut rx = store.subscribe_actions();

    for _ in 0..5 {
        store.send(TicketAction::Open).await.unwrap();
    }

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(3))));
    assert_eq!(store.state(|s| s.open.len()).await, 5);
}

/// Shutdown drains the running effect but rejects the action it feeds back
#[tokio::test]
async fn test_shutdown_drains_effects_and_drops_their_feedback() {
    let store = store();

    store.send(TicketAction::OpenAndConfirm).await.unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    let state = store.snapshot().await;
    assert_eq!(state.open, vec![Uuid::from_u128(1)]);
    // The fed-back action arrives after shutdown began and is dropped.
    assert!(state.confirmed.is_empty());
}
