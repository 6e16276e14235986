//! # Statecraft Runtime
//!
//! Runtime implementation for the Statecraft architecture.
//!
//! This crate provides the Store runtime that owns the current state snapshot,
//! runs the reducer for one action at a time, and tells observers about it.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state, subscribers and effects
//! - **Subscribers**: Observers notified with every new snapshot
//! - **Action observers**: Pass-through receivers of every dispatched action
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//!
//! ## Example
//!
//! ```ignore
//! use statecraft_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Re-render on every change
//! let id = store.subscribe(|state: &MyState| render(state));
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use statecraft_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Reducers themselves never fail; these errors only describe the
    /// lifecycle of the store.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

/// Configuration for a [`Store`]
///
/// # Example
///
/// ```
/// use statecraft_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_action_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.action_broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of dispatched actions buffered for each action observer
    pub action_broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    ///
    /// A capacity of zero is raised to one, the minimum a broadcast channel accepts.
    #[must_use]
    pub fn new(action_broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            action_broadcast_capacity: action_broadcast_capacity.max(1),
            default_shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub fn with_action_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.action_broadcast_capacity = capacity.max(1);
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            action_broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Subscribers notified after every state transition
pub mod subscription {
    use super::metrics::SUBSCRIBERS;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// An observer of state snapshots
    ///
    /// Called synchronously after each transition, while the store still holds
    /// its write lock. Implementations must not dispatch into the same store
    /// from inside [`Subscriber::on_state_change`].
    ///
    /// Any `Fn(&S) + Send + Sync` closure is a subscriber.
    pub trait Subscriber<S>: Send + Sync {
        /// Observe the snapshot produced by the latest transition
        fn on_state_change(&self, state: &S);
    }

    impl<S, F> Subscriber<S> for F
    where
        F: Fn(&S) + Send + Sync,
    {
        fn on_state_change(&self, state: &S) {
            self(state);
        }
    }

    /// Identifies one registration returned by `Store::subscribe`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct SubscriptionId(u64);

    impl std::fmt::Display for SubscriptionId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "subscription-{}", self.0)
        }
    }

    type Entry<S> = (SubscriptionId, Arc<dyn Subscriber<S>>);

    /// Registry of subscribers, in registration order
    pub(crate) struct Subscribers<S> {
        next_id: AtomicU64,
        entries: Mutex<Vec<Entry<S>>>,
    }

    impl<S> Subscribers<S> {
        pub(crate) const fn new() -> Self {
            Self {
                next_id: AtomicU64::new(0),
                entries: Mutex::new(Vec::new()),
            }
        }

        // A panicking subscriber must not disable the registry for everyone else.
        fn lock(&self) -> MutexGuard<'_, Vec<Entry<S>>> {
            self.entries.lock().unwrap_or_else(PoisonError::into_inner)
        }

        pub(crate) fn insert(&self, subscriber: Arc<dyn Subscriber<S>>) -> SubscriptionId {
            let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
            self.lock().push((id, subscriber));
            metrics::gauge!(SUBSCRIBERS).increment(1.0);
            id
        }

        pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
            let mut entries = self.lock();
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            let removed = entries.len() != before;
            if removed {
                metrics::gauge!(SUBSCRIBERS).decrement(1.0);
            }
            removed
        }

        pub(crate) fn len(&self) -> usize {
            self.lock().len()
        }

        /// Notify every subscriber, returning how many were called
        ///
        /// The registry lock is released before any callback runs, so a
        /// subscriber may unsubscribe itself.
        pub(crate) fn notify(&self, state: &S) -> usize {
            let current: Vec<Arc<dyn Subscriber<S>>> = self
                .lock()
                .iter()
                .map(|(_, subscriber)| Arc::clone(subscriber))
                .collect();

            for subscriber in &current {
                subscriber.on_state_change(state);
            }

            current.len()
        }
    }

    // The gauge is shared by every store in the process, so each registry
    // takes back what it still holds when the last store handle goes away.
    impl<S> Drop for Subscribers<S> {
        fn drop(&mut self) {
            let remaining = self
                .entries
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .len();
            if remaining > 0 {
                #[allow(clippy::cast_precision_loss)]
                metrics::gauge!(SUBSCRIBERS).decrement(remaining as f64);
            }
        }
    }
}

pub use subscription::{Subscriber, SubscriptionId};

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
///
/// Runs even if the effect task panics.
struct PendingEffectGuard(Arc<AtomicUsize>);

impl Drop for PendingEffectGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution, subscribers and effects.
pub mod store {
    use super::metrics::{
        ACTIONS_DISPATCHED, ACTIONS_REJECTED, EFFECTS_EXECUTED, REDUCER_DURATION,
        SUBSCRIBERS_NOTIFIED,
    };
    use super::subscription::{Subscriber, Subscribers, SubscriptionId};
    use super::{
        Arc, AtomicBool, AtomicUsize, Duration, Effect, Ordering, PendingEffectGuard, Reducer,
        RwLock, StoreConfig, StoreError,
    };
    use futures::future::{join_all, BoxFuture};
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; one action is reduced at a time)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Subscribers (notified with each new snapshot)
    /// 5. Effect execution (with feedback loop)
    ///
    /// Cloning a Store yields another handle to the same state. Stores built
    /// with separate `new` calls share nothing.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        subscribers: Arc<Subscribers<S>>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Every dispatched action, for pass-through observers (devtools, loggers).
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Clone + Send + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.action_broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                subscribers: Arc::new(Subscribers::new()),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Send an action to the store
        ///
        /// This is the single dispatch entry point:
        /// 1. Acquires the write lock on state
        /// 2. Forwards the action to action observers
        /// 3. Calls the reducer with (state, action, environment)
        /// 4. Notifies every subscriber with the new snapshot
        /// 5. Releases the lock and schedules returned effects
        ///
        /// Concurrent `send()` calls serialize on the write lock, so every
        /// subscriber observes snapshot N before action N+1 is reduced.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer or a subscriber panics, the panic propagates to the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!(ACTIONS_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!(action = ?action, "Dispatching action");
            metrics::counter!(ACTIONS_DISPATCHED).increment(1);

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                // No receivers is not an error: observers are optional.
                let _ = self.action_broadcast.send(action.clone());

                let span = tracing::debug_span!("reducer_execution");
                let start = std::time::Instant::now();
                let effects =
                    span.in_scope(|| self.reducer.reduce(&mut state, action, &self.environment));
                metrics::histogram!(REDUCER_DURATION).record(start.elapsed().as_secs_f64());

                let notified = self.subscribers.notify(&state);
                metrics::counter!(SUBSCRIBERS_NOTIFIED).increment(notified as u64);

                tracing::trace!(
                    effects = effects.len(),
                    subscribers = notified,
                    "Reducer completed"
                );

                effects
            };

            for effect in effects {
                self.execute_effect(effect);
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let open = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Clone the whole current snapshot
        pub async fn snapshot(&self) -> S
        where
            S: Clone,
        {
            self.state(S::clone).await
        }

        /// Register a subscriber notified after every transition
        ///
        /// Subscribers are called in registration order. They do not receive
        /// the state current at registration time, only later snapshots.
        pub fn subscribe<T>(&self, subscriber: T) -> SubscriptionId
        where
            T: Subscriber<S> + 'static,
        {
            let id = self.subscribers.insert(Arc::new(subscriber));
            tracing::debug!(subscription = %id, "Subscriber registered");
            id
        }

        /// Remove a subscriber; returns whether it was registered
        pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
            let removed = self.subscribers.remove(id);
            if removed {
                tracing::debug!(subscription = %id, "Subscriber removed");
            }
            removed
        }

        /// Number of registered subscribers
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.subscribers.len()
        }

        /// Subscribe to every action dispatched into this store
        ///
        /// The receiver sees actions in dispatch order, including actions fed
        /// back by effects. Observers have no influence on state. A receiver
        /// that falls more than `action_broadcast_capacity` actions behind gets
        /// [`broadcast::error::RecvError::Lagged`].
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Whether [`Store::shutdown`] has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Number of effect tasks still running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for pending effects to complete (with timeout)
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to complete"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Shut down using [`StoreConfig::default_shutdown_timeout`]
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects outlive the timeout.
        pub async fn shutdown_with_default_timeout(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Schedule one effect returned by the reducer
        ///
        /// `Effect::None` is dropped immediately; everything else runs in a
        /// spawned task so a panicking effect cannot take the store down.
        fn execute_effect(&self, effect: Effect<A>) {
            if effect.is_none() {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!(EFFECTS_EXECUTED, "type" => "none").increment(1);
                return;
            }

            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = PendingEffectGuard(Arc::clone(&self.pending_effects));
            let store = self.clone();

            tokio::spawn(async move {
                let _pending_guard = pending_guard;
                store.run_effect(effect).await;
            });
        }

        fn run_effect(self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            Box::pin(async move {
                metrics::counter!(EFFECTS_EXECUTED, "type" => effect.kind()).increment(1);

                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        tracing::trace!("Executing Effect::Future");
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            if let Err(error) = self.send(action).await {
                                tracing::warn!(%error, "Dropped action produced by effect");
                            }
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    },
                    Effect::Parallel(effects) => {
                        tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                        join_all(effects.into_iter().map(|effect| self.clone().run_effect(effect)))
                            .await;
                    },
                    Effect::Sequential(effects) => {
                        let effect_count = effects.len();
                        tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!(
                                "Executing sequential effect {} of {}",
                                idx + 1,
                                effect_count
                            );
                            self.clone().run_effect(effect).await;
                        }
                    },
                }
            })
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config.clone(),
                subscribers: Arc::clone(&self.subscribers),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }

    impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("config", &self.config)
                .field("subscribers", &self.subscribers.len())
                .field("pending_effects", &self.pending_effects.load(Ordering::Relaxed))
                .field("shutdown", &self.shutdown.load(Ordering::Relaxed))
                .finish_non_exhaustive()
        }
    }
}

// Re-export for convenience
pub use store::Store;
