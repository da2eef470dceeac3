//! Dependency injection traits.
//!
//! All external dependencies are abstracted behind traits and injected
//! via the Environment parameter of a reducer.

use uuid::Uuid;

/// Supplies unique identifiers for newly created entities
///
/// Implementations must never return an identifier that collides with one
/// issued earlier in the process; identifiers are never reused, even after
/// the entity they named is deleted.
///
/// # Examples
///
/// ```
/// use todo_engine_core::environment::{IdGenerator, UuidGenerator};
///
/// let ids = UuidGenerator;
/// assert_ne!(ids.next_id(), ids.next_id());
/// ```
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier
    fn next_id(&self) -> Uuid;
}

/// Production identifier generator backed by random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
