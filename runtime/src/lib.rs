//! # Todo Engine Runtime
//!
//! Runtime implementation for the todo-engine architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back
//!   to the reducer, honoring cancellation tokens
//! - **Effect Handles**: Let callers await effect completion deterministically
//!
//! ## Example
//!
//! ```ignore
//! use todo_engine_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use todo_engine_core::{
    effect::{Effect, EffectToken},
    reducer::Reducer,
};
use tokio::sync::{RwLock, broadcast, watch};
use tokio::task::AbortHandle;

pub use error::StoreError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown
        /// initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects of an
/// action to complete. With tokio's paused clock this makes delayed effects
/// fully deterministic in tests.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait().await;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle
    ///
    /// Returns the handle (for the caller) and its tracking side (for the
    /// effect executor).
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects of the originating action to complete
    ///
    /// Cancelled effects count as complete: aborting a pending timer settles
    /// the handle just like the timer firing would.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Tracking side dropped; nothing left to wait for
                return;
            }
        }
    }
}

/// Internal tracking side of an [`EffectHandle`]
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement_and_notify(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Decrements effect tracking on drop
///
/// Effect tasks hold one of these so the counter is updated even when the
/// task is aborted mid-sleep by a cancellation token.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement_and_notify();
    }
}

/// Decrements an atomic counter on drop
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The Store runtime
///
/// Owns the state exclusively: callers mutate it only by sending actions, and
/// read it only through [`Store::state`]. Each `send` runs the reducer to
/// completion under the write lock, then spawns the returned effects.
///
/// Scheduled effects wrapped in [`Effect::Cancellable`] are registered in an
/// abort-handle registry keyed by token; scheduling under an occupied token
/// aborts the previous effect first, so at most one effect is ever in flight
/// per token.
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
///
/// # Example
///
/// ```ignore
/// let store = Store::new(TodoState::new(), TodoReducer::new(), env);
///
/// store.send(TodoAction::Add { title: "Buy milk".into() }).await?;
/// ```
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    shutdown: Arc<AtomicBool>,
    pending_effects: Arc<AtomicUsize>,
    cancellations: Arc<Mutex<HashMap<EffectToken, AbortHandle>>>,
    /// Action broadcast channel for observing actions produced by effects.
    ///
    /// All actions produced by effects (e.g., a highlight-clear timer firing)
    /// are broadcast to observers. This is the hook for notification surfaces.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            shutdown: Arc::clone(&self.shutdown),
            pending_effects: Arc::clone(&self.pending_effects),
            cancellations: Arc::clone(&self.cancellations),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Action broadcast capacity defaults to 16; increase it with
    /// [`Store::with_broadcast_capacity`] if observers frequently lag.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new store with a custom action broadcast capacity
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            shutdown: Arc::new(AtomicBool::new(false)),
            pending_effects: Arc::new(AtomicUsize::new(0)),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
            action_broadcast,
        }
    }

    /// Send an action through the reducer and execute its effects
    ///
    /// The reducer runs synchronously under the state write lock; effects are
    /// spawned after the lock is released.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting
    /// down.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected action: store is shutting down");
            metrics::counter!("store.shutdown.rejected_actions").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        tracing::debug!("Processing action");
        metrics::counter!("store.actions.total").increment(1);

        let (handle, tracking) = EffectHandle::new();

        let effects = {
            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let span = tracing::debug_span!("reducer_execution");
            let _enter = span.enter();

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            let duration = start.elapsed();
            metrics::histogram!("store.reducer.duration_seconds").record(duration.as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());
            effects
        };

        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }
        tracing::debug!("Action processing completed, returning handle");

        Ok(handle)
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released promptly:
    ///
    /// ```ignore
    /// let task_count = store.state(|s| s.tasks.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Subscribe to all actions produced by this store's effects
    ///
    /// Returns a receiver that gets a clone of every action an effect feeds
    /// back (not the actions sent via [`Store::send`] directly).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut rx = store.subscribe_actions();
    /// while let Ok(action) = rx.recv().await {
    ///     // surface timer-driven updates to the user
    /// }
    /// ```
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Gracefully shut down the store
    ///
    /// Stops accepting new actions, then waits up to `timeout` for in-flight
    /// effects to finish. Pending cancellable timers are aborted rather than
    /// awaited: there is no one left to observe their feedback.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects were still running
    /// when the timeout elapsed.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Initiating graceful shutdown");
        self.shutdown.store(true, Ordering::Release);

        // Abort pending timers; they only exist to feed actions back
        self.abort_all_cancellable();

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let pending = self.pending_effects.load(Ordering::SeqCst);
            if pending == 0 {
                tracing::info!("All effects completed, shutdown successful");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::error!(pending, "Shutdown timed out with effects still running");
                return Err(StoreError::ShutdownTimeout(pending));
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Execute one effect description
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            }
            Effect::Cancel(token) => {
                tracing::trace!(%token, "Executing Effect::Cancel");
                metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                self.cancel_token(&token);
            }
            Effect::Cancellable { token, effect } => {
                tracing::trace!(%token, "Executing Effect::Cancellable");
                metrics::counter!("store.effects.executed", "type" => "cancellable").increment(1);
                self.spawn_cancellable(token, *effect, tracking);
            }
            delay @ Effect::Delay { .. } => {
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                let _ = self.spawn_effect(delay, tracking);
            }
        }
    }

    /// Spawn an effect task, returning its abort handle
    fn spawn_effect(&self, effect: Effect<A>, tracking: EffectTracking) -> AbortHandle {
        tracking.increment();

        // Track global pending effects for shutdown
        self.pending_effects.fetch_add(1, Ordering::SeqCst);
        let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

        let store = self.clone();
        let task = tokio::spawn(async move {
            let _guard = DecrementGuard(tracking);
            let _pending_guard = pending_guard; // Decrement on drop
            store.run_effect(effect).await;
        });

        task.abort_handle()
    }

    /// Spawn an effect under a cancellation token
    ///
    /// Any in-flight effect holding the same token is aborted first, so a
    /// rescheduled timer supersedes the pending one instead of stacking.
    fn spawn_cancellable(&self, token: EffectToken, effect: Effect<A>, tracking: EffectTracking) {
        self.cancel_token(&token);

        let handle = self.spawn_effect(effect, tracking);

        // Aborting an already-finished task is a no-op, so a stale entry left
        // behind by a completed timer is harmless.
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.cancellations.lock().unwrap().insert(token, handle);
    }

    /// Abort the in-flight effect holding `token`, if any
    fn cancel_token(&self, token: &EffectToken) {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let handle = self.cancellations.lock().unwrap().remove(token);
        if let Some(handle) = handle {
            tracing::trace!(%token, "Aborting in-flight cancellable effect");
            handle.abort();
        }
    }

    /// Abort every registered cancellable effect
    fn abort_all_cancellable(&self) {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let handles: Vec<_> = {
            let mut registry = self.cancellations.lock().unwrap();
            registry.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            handle.abort();
        }
    }

    /// Run one effect to completion inside its spawned task
    ///
    /// A `Cancellable` nested inside an already-spawned effect runs inline:
    /// it is covered by the abort scope of the enclosing task.
    async fn run_effect(&self, effect: Effect<A>) {
        let mut effect = effect;
        loop {
            match effect {
                Effect::None => return,
                Effect::Cancel(token) => {
                    self.cancel_token(&token);
                    return;
                }
                Effect::Cancellable { effect: inner, .. } => {
                    effect = *inner;
                }
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    tokio::time::sleep(duration).await;
                    tracing::trace!("Effect::Delay completed, sending action");

                    // Broadcast to observers
                    let _ = self.action_broadcast.send((*action).clone());

                    if let Err(error) = self.send(*action).await {
                        tracing::warn!(%error, "Delayed action dropped");
                    }
                    return;
                }
            }
        }
    }
}
