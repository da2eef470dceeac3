//! Todo-collection state-transition engine.
//!
//! The engine owns an ordered collection of [`Task`] records and applies one
//! transition per [`TodoAction`]. Everything a user can do on the page (add,
//! edit, complete, delete, describe, search, drag to reorder) is one action;
//! the presentation layer converts user intent into actions and re-renders
//! from the collection the reducer leaves behind.
//!
//! - Pure domain model over an ordered collection
//! - Silent no-ops for stale references (a deleted row must never crash)
//! - Duplicate-title rejection surfaced through [`TodoState::last_rejection`]
//! - Search-and-highlight with a cancellable 2-second flash timer
//! - Testing with `ReducerTest`
//!
//! # Quick Start
//!
//! ```no_run
//! use todo_engine::{TodoAction, TodoEnvironment, TodoReducer, TodoState};
//! use todo_engine_core::environment::UuidGenerator;
//! use todo_engine_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create environment and store
//! let env = TodoEnvironment::new(Arc::new(UuidGenerator));
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Add a task
//! store.send(TodoAction::Add { title: "Buy milk".to_string() }).await?;
//!
//! // Complete it
//! let id = store.state(|s| s.tasks[0].id.clone()).await;
//! store.send(TodoAction::ToggleCompleted { id }).await?;
//!
//! // Read state
//! let state = store.state(|s| s.clone()).await;
//! println!("Total tasks: {}", state.len());
//! println!("Completed: {}", state.completed_count());
//! # Ok(())
//! # }
//! ```

pub mod reducer;
pub mod types;

// Re-export commonly used types
pub use reducer::{HIGHLIGHT_FLASH, TodoEnvironment, TodoReducer};
pub use types::{Rejection, Task, TaskId, TodoAction, TodoState};
