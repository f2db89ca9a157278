//! Top-level entry points: build the root state and run one call tree.

use tracing::{debug, instrument};

use crate::actor::Actor;
use crate::error::ContractViolation;
use crate::io::config::RuntimeConfig;
use crate::lifecycle;
use crate::state::{Fields, State};

/// Runs top-level invocations with a fixed configuration.
///
/// Every call builds and owns its own [`State`]; states are never shared
/// between independent top-level invocations.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Normalize `seed`, fold in `extra`, and run `A`'s full lifecycle.
    ///
    /// Validation errors and declared failures are reported through the
    /// returned state; only contract violations produce `Err`.
    #[instrument(skip_all)]
    pub fn call<A: Actor>(
        &self,
        seed: impl Into<State>,
        extra: Fields,
    ) -> Result<State, ContractViolation> {
        let mut state = root_state(seed, extra);
        lifecycle::execute::<A>(&mut state, &self.config, 0)?;
        debug!(success = state.success(), errors = state.errors().len(), "call finished");
        Ok(state)
    }

    /// Normalize `seed`, fold in `extra`, and run only `A`'s `recover` hook.
    #[instrument(skip_all)]
    pub fn recover<A: Actor>(
        &self,
        seed: impl Into<State>,
        extra: Fields,
    ) -> Result<State, ContractViolation> {
        let mut state = root_state(seed, extra);
        lifecycle::recover::<A>(&mut state, &self.config, 0)?;
        Ok(state)
    }
}

fn root_state(seed: impl Into<State>, extra: Fields) -> State {
    State::normalize(seed).merge_fields(extra)
}
