//! Per-invocation execution lifecycle.
//!
//! ```text
//! defaults(in) -> required(in) -> kinds(in) -> decide
//!     decide: errors present -> done (logic and outputs skipped)
//!             otherwise      -> call hook
//! call hook -> decide
//!     decide: errors present -> done (outputs skipped)
//!             otherwise      -> defaults(out) -> required(out) -> kinds(out) -> done
//! ```
//!
//! Validation errors and declared failures end up in `State::errors`.
//! Contract violations are returned to the caller untouched.

use tracing::{debug, instrument, trace, warn};

use crate::actor::{Actor, Context};
use crate::core::stages::{Direction, validate};
use crate::error::{ContractViolation, Halt, Outcome};
use crate::io::config::RuntimeConfig;
use crate::state::State;

/// Run `A`'s full lifecycle against `state` at nesting `depth`.
#[instrument(skip_all, fields(actor = %A::definition().name(), depth = depth))]
pub fn execute<A: Actor>(
    state: &mut State,
    config: &RuntimeConfig,
    depth: usize,
) -> Result<(), ContractViolation> {
    let definition = A::definition();
    enter::<A>(config, depth)?;

    let appended = validate(Direction::Input, definition.inputs(), state);
    if state.failure() {
        debug!(appended, "input validation failed, skipping logic");
        return Ok(());
    }

    let mut actor = A::default();
    let outcome = actor.call(&mut Context::new(state, config, depth));
    absorb(state, outcome)?;
    if state.failure() {
        debug!("logic left errors, skipping output validation");
        snapshot(config, state);
        return Ok(());
    }

    let appended = validate(Direction::Output, definition.outputs(), state);
    debug!(appended, success = state.success(), "actor finished");
    snapshot(config, state);
    Ok(())
}

/// Run only `A`'s `recover` hook. No validation phase runs.
#[instrument(skip_all, fields(actor = %A::definition().name(), depth = depth))]
pub fn recover<A: Actor>(
    state: &mut State,
    config: &RuntimeConfig,
    depth: usize,
) -> Result<(), ContractViolation> {
    enter::<A>(config, depth)?;

    let mut actor = A::default();
    let outcome = actor.recover(&mut Context::new(state, config, depth));
    absorb(state, outcome)?;
    debug!(success = state.success(), "recovery finished");
    snapshot(config, state);
    Ok(())
}

fn enter<A: Actor>(config: &RuntimeConfig, depth: usize) -> Result<(), ContractViolation> {
    let definition = A::definition();
    definition.ensure_valid()?;
    if depth > config.max_depth {
        return Err(ContractViolation::NestingTooDeep {
            actor: definition.name().to_string(),
            max_depth: config.max_depth,
        });
    }
    Ok(())
}

/// Fold a hook outcome into the state: declared failures become errors,
/// contract violations propagate.
fn absorb(state: &mut State, outcome: Outcome) -> Result<(), ContractViolation> {
    match outcome {
        Ok(()) => Ok(()),
        Err(Halt::Failed(failure)) => {
            warn!(message = %failure.message, "actor declared failure");
            state.add_error(failure.message);
            Ok(())
        }
        Err(Halt::Violation(violation)) => Err(violation),
    }
}

fn snapshot(config: &RuntimeConfig, state: &State) {
    if config.trace_state {
        trace!(state = %state.to_value(), "state snapshot");
    }
}
