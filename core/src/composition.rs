//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on a slice of a larger state
//!
//! Together they build a root reducer out of small slice reducers, each
//! owning one field of the application snapshot.
//!
//! # Examples
//!
//! ```
//! use statecraft_core::composition::{combine_reducers, scope_reducer};
//! use statecraft_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     clicks: u32,
//!     focused: Option<String>,
//! }
//!
//! #[derive(Clone)]
//! enum AppAction {
//!     Click,
//!     Focus(String),
//! }
//!
//! struct ClickReducer;
//! struct FocusReducer;
//!
//! impl Reducer for ClickReducer {
//!     type State = u32;
//!     type Action = AppAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut u32, action: AppAction, _env: &()) -> SmallVec<[Effect<AppAction>; 4]> {
//!         if matches!(action, AppAction::Click) {
//!             *state += 1;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! impl Reducer for FocusReducer {
//!     type State = Option<String>;
//!     type Action = AppAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Option<String>, action: AppAction, _env: &()) -> SmallVec<[Effect<AppAction>; 4]> {
//!         if let AppAction::Focus(name) = action {
//!             *state = Some(name);
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! fn clicks(state: &AppState) -> &u32 {
//!     &state.clicks
//! }
//!
//! fn set_clicks(state: &mut AppState, clicks: u32) {
//!     state.clicks = clicks;
//! }
//!
//! fn focused(state: &AppState) -> &Option<String> {
//!     &state.focused
//! }
//!
//! fn set_focused(state: &mut AppState, focused: Option<String>) {
//!     state.focused = focused;
//! }
//!
//! let root = combine_reducers(vec![
//!     Box::new(scope_reducer(ClickReducer, clicks, set_clicks)),
//!     Box::new(scope_reducer(FocusReducer, focused, set_focused)),
//! ]);
//!
//! let mut state = AppState::default();
//! let _ = root.reduce(&mut state, AppAction::Click, &());
//! let _ = root.reduce(&mut state, AppAction::Focus("search".to_string()), &());
//! assert_eq!(state.clicks, 1);
//! assert_eq!(state.focused.as_deref(), Some("search"));
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// A boxed reducer that can be shared across threads
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, in the order given, and all effects are
/// collected and concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    /// Number of reducers combined
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a reducer to operate on a slice of a larger state.
///
/// The slice is read out of the parent with `get_state`, reduced on its own,
/// and the resulting value is written back with `set_state`. The parent is
/// never observed half-updated.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The slice type
/// - `A`: The action type
/// - `E`: The environment type
pub const fn scope_reducer<S, SubS, A, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
) -> ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a slice of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    _phantom: std::marker::PhantomData<fn() -> (A, E)>,
}

impl<S, SubS, A, E, R> Reducer for ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut slice = (self.get_state)(state).clone();

        let effects = self.reducer.reduce(&mut slice, action, env);

        (self.set_state)(state, slice);

        effects
    }
}
