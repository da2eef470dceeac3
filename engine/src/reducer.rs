//! Reducer logic for the todo collection.
//!
//! One action in, one transition out. Malformed or stale actions degrade to
//! no-ops; the only rejection the engine knows is a duplicate title on add,
//! recorded on the state for the caller to surface.

use std::sync::Arc;
use std::time::Duration;

use todo_engine_core::{
    SmallVec,
    effect::{Effect, EffectToken},
    environment::IdGenerator,
    reducer::Reducer,
    smallvec,
};

use crate::types::{Rejection, Task, TaskId, TodoAction, TodoState};

/// How long a search match stays flashed before the timer clears it
pub const HIGHLIGHT_FLASH: Duration = Duration::from_secs(2);

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of fresh task identifiers
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

/// Reducer for the todo collection
///
/// Transitions build new task and collection values instead of patching
/// records in place, so a cloned previous state stays independently
/// inspectable.
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Replaces the task with `id` by `f(task)`, keeping order
    ///
    /// Unknown ids leave the state untouched.
    fn update_task<F>(state: &mut TodoState, id: &TaskId, f: F)
    where
        F: Fn(&Task) -> Task,
    {
        if state.position(id).is_none() {
            return;
        }

        state.tasks = state
            .tasks
            .iter()
            .map(|task| if &task.id == id { f(task) } else { task.clone() })
            .collect();
        state.last_rejection = None;
    }

    /// Appends a task for `title`, or rejects a duplicate
    ///
    /// The title is trimmed first; empty input is silently ignored.
    fn add(state: &mut TodoState, env: &TodoEnvironment, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }

        if state.find_by_title(title).is_some() {
            state.last_rejection = Some(Rejection::DuplicateTitle {
                title: title.to_string(),
            });
            return;
        }

        let task = Task::new(TaskId::from_uuid(env.ids.next_id()), title.to_string());
        let mut tasks = state.tasks.clone();
        tasks.push(task);
        state.tasks = tasks;
        state.last_rejection = None;
    }

    /// Removes the task with `id`; idempotent
    fn delete(state: &mut TodoState, id: &TaskId) {
        if state.position(id).is_none() {
            return;
        }

        state.tasks = state
            .tasks
            .iter()
            .filter(|task| &task.id != id)
            .cloned()
            .collect();
        state.last_rejection = None;
    }

    /// Moves the task at `source` to `destination`
    ///
    /// Standard single-element list move: remove at `source`, reinsert at
    /// `destination` of the remainder. A missing destination or an index out
    /// of bounds is a no-op.
    fn reorder(state: &mut TodoState, source: usize, destination: Option<usize>) {
        let Some(destination) = destination else {
            return;
        };
        if source >= state.len() || destination >= state.len() {
            return;
        }

        let mut tasks = state.tasks.clone();
        let task = tasks.remove(source);
        tasks.insert(destination, task);
        state.tasks = tasks;
        state.last_rejection = None;
    }

    /// Flashes the first task titled `query` and schedules the clear timer
    ///
    /// The timer is cancellable under a token scoped to the task id, so a
    /// second search for the same task supersedes the pending clear instead
    /// of stacking a second toggle on top of it.
    fn search(state: &mut TodoState, query: &str) -> SmallVec<[Effect<TodoAction>; 4]> {
        let Some(task) = state.find_by_title(query) else {
            return SmallVec::new();
        };

        let id = task.id.clone();
        Self::update_task(state, &id, |task| Task {
            is_highlighted: true,
            ..task.clone()
        });

        let token = EffectToken::scoped(*id.as_uuid());
        smallvec![Effect::cancellable(
            token,
            Effect::delay(HIGHLIGHT_FLASH, TodoAction::ToggleHighlighted { id }),
        )]
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::Add { title } => {
                Self::add(state, env, &title);
            }

            TodoAction::Delete { id } => {
                Self::delete(state, &id);
            }

            TodoAction::ToggleCompleted { id } => {
                Self::update_task(state, &id, |task| Task {
                    completed: !task.completed,
                    ..task.clone()
                });
            }

            TodoAction::ToggleEditing { id } => {
                Self::update_task(state, &id, |task| Task {
                    is_editing: !task.is_editing,
                    ..task.clone()
                });
            }

            TodoAction::SetTitle { id, title } => {
                // Unconditional: live-typing state, no duplicate re-validation
                Self::update_task(state, &id, |task| Task {
                    title: title.clone(),
                    ..task.clone()
                });
            }

            TodoAction::ToggleDescription { id } => {
                // Never clears the text; re-enabling restores it
                Self::update_task(state, &id, |task| Task {
                    has_description: !task.has_description,
                    ..task.clone()
                });
            }

            TodoAction::SetDescription { id, text } => {
                Self::update_task(state, &id, |task| Task {
                    description: text.clone(),
                    ..task.clone()
                });
            }

            TodoAction::ToggleHighlighted { id } => {
                Self::update_task(state, &id, |task| Task {
                    is_highlighted: !task.is_highlighted,
                    ..task.clone()
                });
            }

            TodoAction::Reorder {
                source,
                destination,
            } => {
                Self::reorder(state, source, destination);
            }

            TodoAction::Search { query } => {
                return Self::search(state, &query);
            }
        }

        SmallVec::new()
    }
}
