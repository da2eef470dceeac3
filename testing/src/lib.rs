//! # Todo Engine Testing
//!
//! Testing utilities and helpers for the todo-engine architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A fluent Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todo_engine_testing::{ReducerTest, mocks::SequentialIdGenerator};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::Add { title: "Buy milk".to_string() })
//!     .then_state(|state| {
//!         assert_eq!(state.len(), 1);
//!     })
//!     .run();
//! ```

pub mod reducer_test;

/// Mock implementations of Environment traits
///
/// Deterministic stand-ins for the production collaborators, so tests are
/// reproducible.
pub mod mocks {
    use std::sync::atomic::{AtomicU64, Ordering};

    use todo_engine_core::environment::IdGenerator;
    use uuid::Uuid;

    /// Identifier generator that counts up from one
    ///
    /// Each call returns the next integer embedded in a UUID, so tests can
    /// predict every identifier the reducer will assign.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_engine_testing::mocks::SequentialIdGenerator;
    /// use todo_engine_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), SequentialIdGenerator::nth(1));
    /// assert_eq!(ids.next_id(), SequentialIdGenerator::nth(2));
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Creates a generator whose first identifier is `nth(1)`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(1),
            }
        }

        /// Returns the identifier the generator hands out on its `n`th call
        #[must_use]
        pub const fn nth(n: u64) -> Uuid {
            Uuid::from_u128(n as u128)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> Uuid {
            Self::nth(self.next.fetch_add(1, Ordering::Relaxed))
        }
    }
}

// Re-export commonly used items
pub use mocks::SequentialIdGenerator;
pub use reducer_test::{ReducerTest, assertions};
