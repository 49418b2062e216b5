//! Integration tests for Store action broadcasting
//!
//! Tests the request-response pattern the cart facade relies on: subscribe,
//! send a command, wait for the acknowledgement an effect feeds back, and
//! observe the state that acknowledgement produced.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use go_marketplace_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use go_marketplace_runtime::{Store, StoreConfig, StoreError};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Bump the counter and persist it
    Bump,
    /// Persistence acknowledged the given value
    Persisted { value: u32 },
    /// Persistence rejected the given value
    PersistFailed { value: u32, error: String },
    /// Command that never produces feedback
    Silent,
}

#[derive(Debug, Clone, Default)]
struct TestState {
    counter: u32,
    persisted: Option<u32>,
}

#[derive(Clone)]
struct TestEnvironment {
    fail_writes: bool,
}

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Bump => {
                state.counter += 1;
                let value = state.counter;
                let fail = env.fail_writes;
                smallvec![Effect::future(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    if fail {
                        Some(TestAction::PersistFailed {
                            value,
                            error: "disk full".to_string(),
                        })
                    } else {
                        Some(TestAction::Persisted { value })
                    }
                })]
            },
            TestAction::Persisted { value } => {
                state.persisted = Some(value);
                SmallVec::new()
            },
            TestAction::PersistFailed { .. } | TestAction::Silent => SmallVec::new(),
        }
    }
}

fn new_store(fail_writes: bool) -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(
        TestState::default(),
        TestReducer,
        TestEnvironment { fail_writes },
    )
}

/// Send `action` and return the first feedback action it produces
async fn request(
    store: &Store<TestState, TestAction, TestEnvironment, TestReducer>,
    action: TestAction,
) -> TestAction {
    let mut rx = store.subscribe_actions();
    store.send(action).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("feedback within a second")
        .unwrap()
}

// ============================================================================
// Tests
// ============================================================================

/// The acknowledgement is observed only after it has been reduced.
#[tokio::test]
async fn test_feedback_is_broadcast_after_reduction() {
    let store = new_store(false);

    let ack = request(&store, TestAction::Bump).await;

    assert_eq!(ack, TestAction::Persisted { value: 1 });
    assert_eq!(store.state(|s| s.persisted).await, Some(1));
}

/// Failure acknowledgements are delivered like any other action.
#[tokio::test]
async fn test_failure_feedback_is_broadcast() {
    let store = new_store(true);

    let ack = request(&store, TestAction::Bump).await;

    assert!(matches!(ack, TestAction::PersistFailed { value: 1, .. }));
    assert_eq!(store.state(|s| (s.counter, s.persisted)).await, (1, None));
}

/// A command without feedback completes its handle and broadcasts nothing.
#[tokio::test]
async fn test_command_without_feedback() {
    let store = new_store(false);
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::Silent).await.unwrap();
    tokio::time::timeout(Duration::from_millis(100), handle.wait())
        .await
        .unwrap();

    assert!(rx.try_recv().is_err());
}

/// Sequential requests each receive their own acknowledgement.
#[tokio::test]
async fn test_sequential_requests_are_acknowledged_in_order() {
    let store = new_store(false);

    for expected in 1..=3 {
        let ack = request(&store, TestAction::Bump).await;
        assert_eq!(ack, TestAction::Persisted { value: expected });
    }

    assert_eq!(store.state(|s| s.persisted).await, Some(3));
}

/// The effect handle completes once the feedback has been reduced.
#[tokio::test]
async fn test_handle_waits_for_feedback_reduction() {
    let store = new_store(false);

    let mut handle = store.send(TestAction::Bump).await.unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.persisted).await, Some(1));
    assert_eq!(store.pending_effects(), 0);
}

/// Subscribers receive feedback actions but not the commands that caused them.
#[tokio::test]
async fn test_subscribe_actions_only_sees_feedback() {
    let store = new_store(false);
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::Bump).await.unwrap();
    handle.wait().await;

    assert_eq!(rx.recv().await.unwrap(), TestAction::Persisted { value: 1 });
    assert!(rx.try_recv().is_err());
}

/// Shutdown waits for in-flight effects before returning.
#[tokio::test]
async fn test_shutdown_drains_pending_effects() {
    let store = Store::with_config(
        TestState::default(),
        TestReducer,
        TestEnvironment { fail_writes: false },
        StoreConfig::default().with_action_capacity(4),
    );

    store.send(TestAction::Bump).await.unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    assert_eq!(
        store.send(TestAction::Bump).await.unwrap_err(),
        StoreError::ShutdownInProgress
    );
}
