//! Side effect descriptions.
//!
//! Effects describe side effects to be performed by the runtime.
//! They are values (not execution) and are composable and cancellable.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a cancellable scheduled effect.
///
/// Tokens are compared by value: scheduling a new [`Effect::Cancellable`]
/// under a token that already has an effect in flight replaces (aborts) the
/// old one. Derive the token from a stable domain identifier when the intent
/// is "at most one pending effect per entity".
///
/// # Example
///
/// ```
/// use todo_engine_core::effect::EffectToken;
/// use uuid::Uuid;
///
/// let entity = Uuid::new_v4();
/// assert_eq!(EffectToken::scoped(entity), EffectToken::scoped(entity));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectToken(Uuid);

impl EffectToken {
    /// Creates a fresh, never-before-seen token
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a token scoped to an existing identifier
    ///
    /// Two calls with the same identifier yield equal tokens, so effects
    /// scheduled for the same entity supersede each other.
    #[must_use]
    pub const fn scoped(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EffectToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EffectToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Effect type - describes a side effect to be executed
///
/// Effects are NOT executed immediately. They are descriptions of what should
/// happen, returned from reducers and executed by the Store runtime.
///
/// # Type Parameters
///
/// - `Action`: The action type that effects can produce (feedback loop)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<Action> {
    /// No-op effect
    None,

    /// Delayed action (for timers, flashes, timeouts)
    Delay {
        /// How long to wait
        duration: Duration,
        /// Action to dispatch after delay
        action: Box<Action>,
    },

    /// An effect that can be superseded or cancelled via its token
    ///
    /// The runtime keeps at most one in-flight effect per token: scheduling
    /// a `Cancellable` aborts any pending effect holding the same token
    /// before the new one starts.
    Cancellable {
        /// Cancellation token identifying this effect
        token: EffectToken,
        /// The effect to run under the token
        effect: Box<Effect<Action>>,
    },

    /// Abort the in-flight effect holding this token, if any
    Cancel(EffectToken),
}

impl<Action> Effect<Action> {
    /// Wraps an effect so it can be cancelled or superseded via `token`
    #[must_use]
    pub fn cancellable(token: EffectToken, effect: Self) -> Self {
        Self::Cancellable {
            token,
            effect: Box::new(effect),
        }
    }

    /// Schedules `action` to be dispatched after `duration`
    #[must_use]
    pub fn delay(duration: Duration, action: Action) -> Self {
        Self::Delay {
            duration,
            action: Box::new(action),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)] // Test code can panic
mod tests {
    use super::*;

    #[test]
    fn scoped_tokens_are_stable() {
        let id = Uuid::new_v4();
        assert_eq!(EffectToken::scoped(id), EffectToken::scoped(id));
    }

    #[test]
    fn fresh_tokens_differ() {
        assert_ne!(EffectToken::new(), EffectToken::new());
    }

    #[test]
    fn delay_helper_boxes_action() {
        let effect: Effect<&str> = Effect::delay(Duration::from_secs(2), "clear");
        match effect {
            Effect::Delay { duration, action } => {
                assert_eq!(duration, Duration::from_secs(2));
                assert_eq!(*action, "clear");
            }
            other => panic!("expected Delay, got {other:?}"),
        }
    }

    #[test]
    fn cancellable_helper_wraps_effect() {
        let token = EffectToken::new();
        let effect: Effect<&str> =
            Effect::cancellable(token, Effect::delay(Duration::from_millis(5), "x"));
        match effect {
            Effect::Cancellable { token: t, effect } => {
                assert_eq!(t, token);
                assert!(matches!(*effect, Effect::Delay { .. }));
            }
            other => panic!("expected Cancellable, got {other:?}"),
        }
    }
}
