//! Failure channels for actor logic.
//!
//! Two channels are kept apart:
//!
//! - [`Failure`]: a declared business-logic failure. The lifecycle absorbs it
//!   into `State::errors` and the caller sees a failed state.
//! - [`ContractViolation`]: a programming or declaration error. It is never
//!   absorbed and propagates out of the whole call tree.

use thiserror::Error;

/// Explicit, named failure raised by an actor's own logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Misuse of the runtime that must not be turned into state errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// A composition step names a method the actor never registered.
    #[error("actor {actor} has no method named '{method}'")]
    UnknownMethod { actor: String, method: String },

    /// The actor's definition recorded problems when it was built.
    #[error("actor {actor} has an invalid declaration: {}", .problems.join("; "))]
    InvalidDeclaration { actor: String, problems: Vec<String> },

    /// Nested actor invocations exceeded the configured depth.
    #[error("actor {actor} exceeds maximum nesting depth {max_depth}")]
    NestingTooDeep { actor: String, max_depth: usize },
}

/// Why a hook or composition step stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Halt {
    #[error(transparent)]
    Failed(#[from] Failure),
    #[error(transparent)]
    Violation(#[from] ContractViolation),
}

/// Result of running a hook, method or inline step.
pub type Outcome = Result<(), Halt>;

/// Stop the current actor with a declared failure.
///
/// ```ignore
/// if balance < amount {
///     return fail("insufficient funds");
/// }
/// ```
pub fn fail(message: impl Into<String>) -> Outcome {
    Err(Halt::Failed(Failure::new(message)))
}
