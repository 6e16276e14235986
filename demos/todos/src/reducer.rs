//! Reducer logic for the todo store.
//!
//! Each slice of [`TodoAppState`] has its own reducer, and [`TodoReducer`]
//! combines them. The slice reducers delegate to the `next_*` functions,
//! which compute the next value of their slice from the previous one.

use crate::actions::TodoAction;
use crate::types::{MutationCounter, Selection, TodoAppState, TodoId, TodoItem, TodoList};
use statecraft_core::composition::{BoxedReducer, CombinedReducer, combine_reducers, scope_reducer};
use statecraft_core::{SmallVec, effect::Effect, environment::IdGenerator, reducer::Reducer};
use std::sync::Arc;

/// Environment dependencies for the todo reducers
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for created todos
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Next value of the todo list after `action`
///
/// `Create` draws one id from `ids`; no other action touches it. Edit,
/// toggle and remove act on the first record with a matching id and leave
/// the list as it was when there is none. The previous list is consumed, so
/// its items are moved rather than copied.
#[must_use]
pub fn next_todos(todos: TodoList, action: &TodoAction, ids: &dyn IdGenerator) -> TodoList {
    let target = match action {
        TodoAction::Edit { id, .. } | TodoAction::Toggle { id, .. } | TodoAction::Remove { id } => {
            todos.position(id)
        },
        TodoAction::Create { .. } | TodoAction::Select { .. } => None,
    };
    let mut items = todos.into_vec();

    match action {
        TodoAction::Create { description } => {
            let id = TodoId::from_uuid(ids.next_id());
            items.push(TodoItem::new(id, description.clone()));
        },
        TodoAction::Edit { description, .. } => {
            if let Some(item) = target.and_then(|index| items.get_mut(index)) {
                item.description.clone_from(description);
            }
        },
        TodoAction::Toggle { is_complete, .. } => {
            if let Some(item) = target.and_then(|index| items.get_mut(index)) {
                item.is_complete = *is_complete;
            }
        },
        TodoAction::Remove { .. } => {
            if let Some(index) = target {
                items.remove(index);
            }
        },
        TodoAction::Select { .. } => {},
    }

    TodoList::from(items)
}

/// Next selection after `action`
#[must_use]
pub const fn next_selection(selected: Selection, action: &TodoAction) -> Selection {
    match action {
        TodoAction::Select { id } => Selection::of(*id),
        _ => selected,
    }
}

/// Next counter value after `action`
#[must_use]
pub const fn next_counter(counter: MutationCounter, action: &TodoAction) -> MutationCounter {
    if action.is_mutation() {
        counter.incremented()
    } else {
        counter
    }
}

/// Reducer for the `todos` slice
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoListReducer;

impl Reducer for TodoListReducer {
    type State = TodoList;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let TodoAction::Edit { id, .. } | TodoAction::Toggle { id, .. } | TodoAction::Remove { id } =
            &action
        {
            if !state.contains(id) {
                tracing::trace!(%id, action = action.kind(), "No todo with this id");
            }
        }

        *state = next_todos(std::mem::take(state), &action, env.ids.as_ref());
        SmallVec::new()
    }
}

/// Reducer for the `selected` slice
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionReducer;

impl Reducer for SelectionReducer {
    type State = Selection;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        *state = next_selection(*state, &action);
        SmallVec::new()
    }
}

/// Reducer for the `counter` slice
#[derive(Clone, Copy, Debug, Default)]
pub struct MutationCounterReducer;

impl Reducer for MutationCounterReducer {
    type State = MutationCounter;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        *state = next_counter(*state, &action);
        SmallVec::new()
    }
}

const fn todos(state: &TodoAppState) -> &TodoList {
    &state.todos
}

fn set_todos(state: &mut TodoAppState, todos: TodoList) {
    state.todos = todos;
}

const fn selected(state: &TodoAppState) -> &Selection {
    &state.selected
}

fn set_selected(state: &mut TodoAppState, selected: Selection) {
    state.selected = selected;
}

const fn counter(state: &TodoAppState) -> &MutationCounter {
    &state.counter
}

fn set_counter(state: &mut TodoAppState, counter: MutationCounter) {
    state.counter = counter;
}

/// Root reducer for the todo store
///
/// Runs the list, selection and counter reducers, in that order, each on
/// its own slice of [`TodoAppState`].
#[derive(Debug)]
pub struct TodoReducer {
    slices: CombinedReducer<TodoAppState, TodoAction, TodoEnvironment>,
}

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub fn new() -> Self {
        let slices: Vec<BoxedReducer<TodoAppState, TodoAction, TodoEnvironment>> = vec![
            Box::new(scope_reducer(TodoListReducer, todos, set_todos)),
            Box::new(scope_reducer(SelectionReducer, selected, set_selected)),
            Box::new(scope_reducer(MutationCounterReducer, counter, set_counter)),
        ];

        Self {
            slices: combine_reducers(slices),
        }
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoAppState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.slices.reduce(state, action, env)
    }
}
