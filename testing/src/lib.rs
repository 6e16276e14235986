//! # Statecraft Testing
//!
//! Testing utilities and helpers for the Statecraft architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A recording subscriber for store tests
//! - The [`ReducerTest`] Given-When-Then harness
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use statecraft_testing::{test_ids, RecordingSubscriber};
//! use statecraft_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_session_flow() {
//!     let store = Store::new(SessionState::default(), SessionReducer, env_with(test_ids()));
//!     let recorder = RecordingSubscriber::new();
//!     store.subscribe(recorder.clone());
//!
//!     store.send(SessionAction::Open { name: "demo".into() }).await?;
//!
//!     assert_eq!(recorder.len(), 1);
//! }
//! ```

use statecraft_core::environment::IdGenerator;
use statecraft_runtime::Subscriber;
use uuid::Uuid;

/// Fluent Given-When-Then reducer tests
pub mod reducer_test;

/// Mock implementations of Environment traits and store observers
pub mod mocks {
    use super::{IdGenerator, Subscriber, Uuid};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// Sequential id generator for deterministic tests
    ///
    /// Yields `00000000-0000-0000-0000-000000000001`, then `...02`, and so on.
    ///
    /// # Example
    ///
    /// ```
    /// use statecraft_testing::mocks::SequentialIdGenerator;
    /// use statecraft_core::environment::IdGenerator;
    /// use uuid::Uuid;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), Uuid::from_u128(1));
    /// assert_eq!(ids.next_id(), Uuid::from_u128(2));
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is `1`
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Create a generator whose first id is `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }

        /// The id the next call to `next_id` will return
        #[must_use]
        pub fn peek(&self) -> Uuid {
            Uuid::from_u128(u128::from(self.next.load(Ordering::SeqCst)))
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> Uuid {
            Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst)))
        }
    }

    /// Create a shared sequential id generator for tests
    #[must_use]
    pub fn test_ids() -> Arc<SequentialIdGenerator> {
        Arc::new(SequentialIdGenerator::new())
    }

    /// Subscriber that keeps a copy of every snapshot it is notified with
    ///
    /// Clones share the same recording, so keep one clone and hand the
    /// other to `Store::subscribe`.
    #[derive(Debug)]
    pub struct RecordingSubscriber<S> {
        snapshots: Arc<Mutex<Vec<S>>>,
    }

    impl<S> RecordingSubscriber<S> {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self {
                snapshots: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn lock(&self) -> MutexGuard<'_, Vec<S>> {
            self.snapshots.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Number of notifications received
        #[must_use]
        pub fn len(&self) -> usize {
            self.lock().len()
        }

        /// Whether no notification was received yet
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.lock().is_empty()
        }
    }

    impl<S: Clone> RecordingSubscriber<S> {
        /// All recorded snapshots, oldest first
        #[must_use]
        pub fn snapshots(&self) -> Vec<S> {
            self.lock().clone()
        }

        /// The most recent snapshot
        #[must_use]
        pub fn last(&self) -> Option<S> {
            self.lock().last().cloned()
        }
    }

    impl<S> Clone for RecordingSubscriber<S> {
        fn clone(&self) -> Self {
            Self {
                snapshots: Arc::clone(&self.snapshots),
            }
        }
    }

    impl<S> Default for RecordingSubscriber<S> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S> Subscriber<S> for RecordingSubscriber<S>
    where
        S: Clone + Send,
    {
        fn on_state_change(&self, state: &S) {
            self.lock().push(state.clone());
        }
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{RecordingSubscriber, SequentialIdGenerator, test_ids};
pub use reducer_test::{ReducerTest, assertions};
