//! Scripted terminal walkthrough of the todo engine.
//!
//! Drives the store through every operation the page offers: add, duplicate
//! rejection, complete, edit, describe, reorder, search with the highlight
//! flash, and delete. The re-render after each step is a plain println of
//! the collection, which is all a rendering surface is contractually owed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use todo_engine::{TodoAction, TodoEnvironment, TodoReducer, TodoState};
use todo_engine_core::environment::UuidGenerator;
use todo_engine_runtime::Store;

fn print_list(state: &TodoState) {
    if state.is_empty() {
        println!("  (no tasks)");
        return;
    }
    for task in &state.tasks {
        let check = if task.completed { "x" } else { " " };
        let flash = if task.is_highlighted { " «" } else { "" };
        println!("  [{check}] {}{flash}", task.title);
        if task.has_description {
            println!("        {}", task.description);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Todo Engine Demo ===\n");

    let env = TodoEnvironment::new(Arc::new(UuidGenerator));
    let store = Store::new(TodoState::new(), TodoReducer::new(), env);

    println!("Adding tasks...");
    for title in ["Buy milk", "Write documentation", "Water the plants"] {
        store
            .send(TodoAction::Add {
                title: title.to_string(),
            })
            .await?;
    }
    print_list(&store.state(Clone::clone).await);

    // A duplicate add is rejected, not applied; the caller surfaces it
    println!("\nAdding 'Buy milk' again...");
    store
        .send(TodoAction::Add {
            title: "Buy milk".to_string(),
        })
        .await?;
    if let Some(rejection) = store.state(|s| s.last_rejection.clone()).await {
        println!("  rejected: {rejection}");
    }

    println!("\nCompleting 'Buy milk'...");
    let id = store
        .state(|s| s.tasks[0].id.clone())
        .await;
    store.send(TodoAction::ToggleCompleted { id }).await?;
    print_list(&store.state(Clone::clone).await);

    println!("\nRetitling 'Write documentation'...");
    let id = store.state(|s| s.tasks[1].id.clone()).await;
    store.send(TodoAction::ToggleEditing { id: id.clone() }).await?;
    store
        .send(TodoAction::SetTitle {
            id: id.clone(),
            title: "Write the release notes".to_string(),
        })
        .await?;
    store.send(TodoAction::ToggleEditing { id: id.clone() }).await?;

    println!("Attaching a description...");
    store.send(TodoAction::ToggleDescription { id: id.clone() }).await?;
    store
        .send(TodoAction::SetDescription {
            id,
            text: "cover the reorder fix".to_string(),
        })
        .await?;
    print_list(&store.state(Clone::clone).await);

    println!("\nDragging the first task to the end...");
    store
        .send(TodoAction::Reorder {
            source: 0,
            destination: Some(2),
        })
        .await?;
    print_list(&store.state(Clone::clone).await);

    println!("\nSearching for 'Water the plants'...");
    let mut handle = store
        .send(TodoAction::Search {
            query: "Water the plants".to_string(),
        })
        .await?;
    print_list(&store.state(Clone::clone).await);

    println!("  ...waiting for the flash to clear...");
    handle.wait().await;
    print_list(&store.state(Clone::clone).await);

    println!("\nDeleting the completed task...");
    let id = store
        .state(|s| {
            s.tasks
                .iter()
                .find(|t| t.completed)
                .map(|t| t.id.clone())
        })
        .await;
    if let Some(id) = id {
        store.send(TodoAction::Delete { id }).await?;
    }
    print_list(&store.state(Clone::clone).await);

    store.shutdown(Duration::from_secs(5)).await?;
    println!("\n=== Demo Complete ===");
    Ok(())
}
