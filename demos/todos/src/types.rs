//! Domain types for the todo list.
//!
//! The application snapshot is split into three independently reduced
//! slices: the list of records, the selection, and the mutation counter.

use serde::{Deserialize, Serialize};
use statecraft_core::environment::IdGenerator;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_uuid())
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique identifier, never reassigned
    pub id: TodoId,
    /// Free-form description
    pub description: String,
    /// Whether the todo is done
    pub is_complete: bool,
}

impl TodoItem {
    /// Creates a new, incomplete todo item
    #[must_use]
    pub const fn new(id: TodoId, description: String) -> Self {
        Self {
            id,
            description,
            is_complete: false,
        }
    }
}

/// Ordered collection of todo items
///
/// New items go to the end. There is no reordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList(Vec<TodoItem>);

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|t| t.is_complete).count()
    }

    /// First item with the given id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.0.iter().find(|t| t.id == *id)
    }

    /// Index of the first item with the given id
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.0.iter().position(|t| t.id == *id)
    }

    /// Checks if an item exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    /// First item whose description equals `description`
    #[must_use]
    pub fn find_by_description(&self, description: &str) -> Option<&TodoItem> {
        self.0.iter().find(|t| t.description == description)
    }

    /// Items in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.0.iter()
    }

    /// Items as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[TodoItem] {
        &self.0
    }

    /// Consumes the list, returning its items
    #[must_use]
    pub fn into_vec(self) -> Vec<TodoItem> {
        self.0
    }
}

impl From<Vec<TodoItem>> for TodoList {
    fn from(items: Vec<TodoItem>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The currently selected todo, if any
///
/// The id is held by value and may outlive the record it names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(Option<TodoId>);

impl Selection {
    /// Nothing selected
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// `id` selected
    #[must_use]
    pub const fn of(id: TodoId) -> Self {
        Self(Some(id))
    }

    /// The selected id
    #[must_use]
    pub const fn id(&self) -> Option<TodoId> {
        self.0
    }
}

/// Number of create/edit/toggle/remove actions reduced so far
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationCounter(u64);

impl MutationCounter {
    /// Counter starting at `value`
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Current value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Counter advanced by one
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Descriptions and completion flags of the records every session starts with
pub const SEED_TODOS: [(&str, bool); 3] = [
    ("Learn React", true),
    ("Learn Redux", true),
    ("Learn Redux-ToolKit", false),
];

/// Complete application snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoAppState {
    /// All todo items
    pub todos: TodoList,
    /// Selected todo
    pub selected: Selection,
    /// Mutation counter
    pub counter: MutationCounter,
}

impl TodoAppState {
    /// Creates an empty snapshot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: TodoList::new(),
            selected: Selection::none(),
            counter: MutationCounter::new(0),
        }
    }

    /// The session start state: [`SEED_TODOS`], nothing selected, counter at zero
    #[must_use]
    pub fn seeded(ids: &dyn IdGenerator) -> Self {
        let todos = SEED_TODOS
            .iter()
            .map(|&(description, is_complete)| TodoItem {
                id: TodoId::from_uuid(ids.next_id()),
                description: description.to_string(),
                is_complete,
            })
            .collect::<Vec<_>>();

        Self {
            todos: TodoList::from(todos),
            ..Self::new()
        }
    }
}
