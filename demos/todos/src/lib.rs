//! Todo list state store built on the Statecraft architecture.
//!
//! The store holds one snapshot made of three slices:
//!
//! - the ordered list of todos
//! - the selected todo id, if any
//! - a counter of create/edit/toggle/remove actions
//!
//! Each slice has its own reducer; [`TodoReducer`] combines them.
//!
//! # Quick Start
//!
//! ```no_run
//! use statecraft_core::environment::RandomIdGenerator;
//! use statecraft_runtime::StoreConfig;
//! use std::sync::Arc;
//! use todos::{TodoAction, TodoEnvironment, seeded_store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::new(Arc::new(RandomIdGenerator));
//! let store = seeded_store(env, StoreConfig::default());
//!
//! store.subscribe(|state: &todos::TodoAppState| {
//!     println!("{} todos, {} changes", state.todos.len(), state.counter.value());
//! });
//!
//! store.send(TodoAction::create("Buy milk")).await?;
//!
//! let open = store.state(|s| s.todos.len() - s.todos.completed_count()).await;
//! println!("Open todos: {open}");
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod config;
pub mod reducer;
pub mod types;

use statecraft_runtime::{Store, StoreConfig};

// Re-export commonly used types
pub use actions::TodoAction;
pub use config::{ConfigError, DemoConfig};
pub use reducer::{
    MutationCounterReducer, SelectionReducer, TodoEnvironment, TodoListReducer, TodoReducer,
};
pub use types::{MutationCounter, Selection, TodoAppState, TodoId, TodoItem, TodoList};

/// Store type for the todo domain
pub type TodoStore = Store<TodoAppState, TodoAction, TodoEnvironment, TodoReducer>;

/// Build a store holding the seeded session state
///
/// The seed records draw their ids from `env.ids`.
#[must_use]
pub fn seeded_store(env: TodoEnvironment, config: StoreConfig) -> TodoStore {
    let initial = TodoAppState::seeded(env.ids.as_ref());
    Store::with_config(initial, TodoReducer::new(), env, config)
}
