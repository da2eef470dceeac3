//! Domain types for the todo engine.
//!
//! A todo list is an ordered collection of tasks. Order is significant: it is
//! the on-screen order, and it is the only thing a reorder changes. Tasks are
//! created through the reducer, updated by replacement, and removed for good
//! on delete.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a task
///
/// Assigned at creation, immutable, never reused even after deletion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random `TaskId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TaskId` from a UUID
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

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task on the list
///
/// The transient UI flags (`is_editing`, `is_highlighted`) are independent
/// booleans toggled only by their own action; any combination is legal. They
/// live on the record, matching how the collection is rendered row by row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Text of the task, non-empty at creation
    pub title: String,
    /// Whether the task is done
    pub completed: bool,
    /// Whether the title is in its edit affordance
    pub is_editing: bool,
    /// Whether the row is flashed as a search match
    pub is_highlighted: bool,
    /// Whether the description is shown
    pub has_description: bool,
    /// Description text; retained while hidden so re-enabling restores it
    pub description: String,
}

impl Task {
    /// Creates a new task with all flags at their defaults
    #[must_use]
    pub const fn new(id: TaskId, title: String) -> Self {
        Self {
            id,
            title,
            completed: false,
            is_editing: false,
            is_highlighted: false,
            has_description: false,
            description: String::new(),
        }
    }
}

/// Why an action was rejected instead of applied
///
/// Rejections are data, not failures: the reducer records the most recent one
/// on the state and leaves the collection untouched. The caller surfaces it
/// to the user (a toast, typically).
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    /// A task with this exact title already exists
    #[error("a task titled {title:?} already exists")]
    DuplicateTitle {
        /// The offending title
        title: String,
    },
}

/// State of the todo list
///
/// The collection lives only for the session; it starts empty (or from the
/// demo fixture) and is never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// All tasks, in on-screen order
    pub tasks: Vec<Task>,
    /// Most recent rejected action, if any
    pub last_rejection: Option<Rejection>,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            last_rejection: None,
        }
    }

    /// Creates a state pre-seeded with a few tasks, for demos and tests
    #[must_use]
    pub fn demo_fixture() -> Self {
        let tasks = ["Buy milk", "Write documentation", "Water the plants"]
            .into_iter()
            .map(|title| Task::new(TaskId::new(), title.to_string()))
            .collect();

        Self {
            tasks,
            last_rejection: None,
        }
    }

    /// Returns the number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the list has no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Returns a task by ID
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Returns the position of a task in the on-screen order
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Returns the first task whose title equals `title` exactly
    #[must_use]
    pub fn find_by_title(&self, title: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.title == title)
    }
}

/// Actions the engine can apply, one transition per call
///
/// Each variant maps to one user-visible operation. Variants referencing an
/// absent `id` or index are benign no-ops: a rendered row may race a deletion
/// and its stale reference must not crash the interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    /// Append a new task with this title
    ///
    /// The title is trimmed first. Empty input is silently ignored; a title
    /// equal to an existing task's title is rejected with
    /// [`Rejection::DuplicateTitle`].
    Add {
        /// Title of the new task
        title: String,
    },

    /// Remove a task permanently (idempotent)
    Delete {
        /// Task to remove
        id: TaskId,
    },

    /// Flip a task's completed flag
    ToggleCompleted {
        /// Task to toggle
        id: TaskId,
    },

    /// Flip a task's title between display and edit affordance
    ToggleEditing {
        /// Task to toggle
        id: TaskId,
    },

    /// Replace a task's title unconditionally
    ///
    /// No duplicate re-validation, and empty is permitted: this is the
    /// live-typing state of an edit in progress.
    SetTitle {
        /// Task to edit
        id: TaskId,
        /// New title text
        title: String,
    },

    /// Flip whether a task's description is shown
    ///
    /// Hiding the description does not clear its text.
    ToggleDescription {
        /// Task to toggle
        id: TaskId,
    },

    /// Replace a task's description text unconditionally
    SetDescription {
        /// Task to edit
        id: TaskId,
        /// New description text
        text: String,
    },

    /// Flip a task's highlight flash
    ///
    /// Also the feedback action of the search timer, which clears the flash
    /// after [`crate::HIGHLIGHT_FLASH`].
    ToggleHighlighted {
        /// Task to toggle
        id: TaskId,
    },

    /// Move one task from `source` to `destination`, shifting the rest
    ///
    /// `destination: None` models a drag released outside any drop target
    /// and is a no-op, as is any out-of-bounds index.
    Reorder {
        /// Index the task is dragged from
        source: usize,
        /// Index it is dropped at, if the drop landed anywhere
        destination: Option<usize>,
    },

    /// Flash the first task whose title equals `query`
    ///
    /// A miss is a no-op, not an error. A hit turns the highlight on and
    /// schedules a cancellable timer to turn it back off.
    Search {
        /// Exact title to look for
        query: String,
    },
}
