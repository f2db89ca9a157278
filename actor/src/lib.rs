//! Composable, self-validating units of business logic.
//!
//! An [`Actor`] is a single-purpose step that runs against a shared,
//! dynamically shaped [`State`]. Each actor type declares a [`Definition`]:
//! typed inputs and outputs, named methods, and an ordered list of guarded
//! composition steps that may call other actors on the same state.
//!
//! - **[`core`]**: Pure schema and validation logic (kinds, defaults,
//!   requiredness). No I/O, fully testable in isolation.
//! - **[`io`]**: Configuration loading, kept out of the core.
//!
//! Orchestration modules ([`lifecycle`], [`compose`], [`runtime`]) tie the
//! core to actor hooks. Callers only inspect the returned state to tell
//! success from failure; [`ContractViolation`]s are the one error that
//! escapes a call.

pub mod actor;
pub mod compose;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod lifecycle;
pub mod logging;
pub mod runtime;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use actor::{Actor, Context, Definition, DefinitionBuilder, Method};
pub use compose::{ActorRef, Runnable, Target};
pub use crate::core::kind::Kind;
pub use crate::core::schema::FieldSpec;
pub use error::{ContractViolation, Failure, Halt, Outcome, fail};
pub use io::config::RuntimeConfig;
pub use runtime::Runtime;
pub use state::{Fields, State};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
