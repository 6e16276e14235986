//! The closed set of actions the todo store accepts.

use crate::types::TodoId;
use serde::{Deserialize, Serialize};

/// Actions accepted by the todo store
///
/// Serialized as `{"type": "Create", "payload": {"description": "..."}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TodoAction {
    /// Append a new, incomplete todo with a freshly generated id
    Create {
        /// Description of the new todo
        description: String,
    },

    /// Replace the description of a todo
    Edit {
        /// Todo to edit
        id: TodoId,
        /// New description
        description: String,
    },

    /// Set the completion flag of a todo
    #[serde(rename_all = "camelCase")]
    Toggle {
        /// Todo to update
        id: TodoId,
        /// New completion flag
        is_complete: bool,
    },

    /// Delete a todo
    Remove {
        /// Todo to delete
        id: TodoId,
    },

    /// Mark a todo as selected; the id is not checked against the list
    Select {
        /// Todo to select
        id: TodoId,
    },
}

impl TodoAction {
    /// Builds a `Create` action
    #[must_use]
    pub fn create(description: impl Into<String>) -> Self {
        Self::Create {
            description: description.into(),
        }
    }

    /// Builds an `Edit` action
    #[must_use]
    pub fn edit(id: TodoId, description: impl Into<String>) -> Self {
        Self::Edit {
            id,
            description: description.into(),
        }
    }

    /// Builds a `Toggle` action
    #[must_use]
    pub const fn toggle(id: TodoId, is_complete: bool) -> Self {
        Self::Toggle { id, is_complete }
    }

    /// Builds a `Remove` action
    #[must_use]
    pub const fn remove(id: TodoId) -> Self {
        Self::Remove { id }
    }

    /// Builds a `Select` action
    #[must_use]
    pub const fn select(id: TodoId) -> Self {
        Self::Select { id }
    }

    /// Whether this action advances the mutation counter
    ///
    /// True for create, edit, toggle and remove, matched record or not.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        match self {
            Self::Create { .. } | Self::Edit { .. } | Self::Toggle { .. } | Self::Remove { .. } => {
                true
            },
            Self::Select { .. } => false,
        }
    }

    /// The action tag, as it appears in the serialized `type` field
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "Create",
            Self::Edit { .. } => "Edit",
            Self::Toggle { .. } => "Toggle",
            Self::Remove { .. } => "Remove",
            Self::Select { .. } => "Select",
        }
    }
}
