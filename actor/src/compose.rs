//! Declarative composition: ordered, optionally guarded sub-steps executed
//! against the caller's state.
//!
//! Each [`Runnable`] is one declared step: a list of targets plus optional
//! `when` (run only if true) and `unless` (skip if true) guards. Guards are
//! evaluated once per runnable, `when` first. Targets run strictly in
//! declaration order with no retries and no reordering.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::actor::{Actor, Context, Definition};
use crate::error::{ContractViolation, Halt, Outcome};
use crate::io::config::RuntimeConfig;
use crate::lifecycle;
use crate::state::State;

/// Guard evaluated against the live state.
pub type Predicate = Arc<dyn Fn(&State) -> bool + Send + Sync>;

/// Inline step receiving the state as its only argument.
pub type InlineFn = Arc<dyn Fn(&mut State) -> Outcome + Send + Sync>;

type Execute = fn(&mut State, &RuntimeConfig, usize) -> Result<(), ContractViolation>;

/// Type-erased handle to another actor's full lifecycle.
#[derive(Clone, Copy)]
pub struct ActorRef {
    name: fn() -> &'static str,
    execute: Execute,
}

impl ActorRef {
    pub fn of<B: Actor>() -> Self {
        Self {
            name: actor_name::<B>,
            execute: lifecycle::execute::<B>,
        }
    }

    pub fn name(&self) -> &'static str {
        (self.name)()
    }

    pub(crate) fn run(
        &self,
        state: &mut State,
        config: &RuntimeConfig,
        depth: usize,
    ) -> Result<(), ContractViolation> {
        (self.execute)(state, config, depth)
    }
}

fn actor_name<B: Actor>() -> &'static str {
    B::definition().name()
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({})", self.name())
    }
}

/// One invocation target inside a runnable.
#[derive(Clone)]
pub enum Target {
    /// A method registered on the current actor's definition.
    Method(&'static str),
    /// Another actor, run through its full lifecycle on the same state.
    Actor(ActorRef),
    /// A closure over the state.
    Inline(InlineFn),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Method(name) => write!(f, "Method({name})"),
            Target::Actor(actor) => write!(f, "Actor({})", actor.name()),
            Target::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

/// A declared composition step.
#[derive(Clone, Default)]
pub struct Runnable {
    targets: Vec<Target>,
    when: Option<Predicate>,
    unless: Option<Predicate>,
}

impl Runnable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor<B: Actor>(mut self) -> Self {
        self.targets.push(Target::Actor(ActorRef::of::<B>()));
        self
    }

    pub fn method(mut self, name: &'static str) -> Self {
        self.targets.push(Target::Method(name));
        self
    }

    pub fn inline<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut State) -> Outcome + Send + Sync + 'static,
    {
        self.targets.push(Target::Inline(Arc::new(f)));
        self
    }

    /// Run only when `predicate` holds.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Arc::new(predicate));
        self
    }

    /// Skip when `predicate` holds.
    pub fn unless<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.unless = Some(Arc::new(predicate));
        self
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Evaluate guards: `when` first, then `unless`. Absent guards allow.
    pub fn permits(&self, state: &State) -> bool {
        if let Some(when) = &self.when {
            if !when(state) {
                return false;
            }
        }
        if let Some(unless) = &self.unless {
            if unless(state) {
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for Runnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runnable")
            .field("targets", &self.targets)
            .field("when", &self.when.is_some())
            .field("unless", &self.unless.is_some())
            .finish()
    }
}

/// Run every permitted runnable of `definition` against `ctx`, in order.
///
/// A declared failure from a method or inline target stops the remaining
/// steps and is returned to the actor's lifecycle. Nested actors record
/// their own failures in the shared state and never halt the fold.
#[instrument(skip_all, fields(actor = %definition.name(), depth = ctx.depth()))]
pub fn run_steps<A: Actor>(
    definition: &Definition<A>,
    actor: &mut A,
    ctx: &mut Context<'_>,
) -> Outcome {
    for (index, runnable) in definition.runnables().iter().enumerate() {
        if !runnable.permits(ctx.state()) {
            debug!(index, "runnable skipped by guard");
            continue;
        }
        for target in runnable.targets() {
            debug!(index, ?target, "dispatching target");
            dispatch(definition, actor, ctx, target)?;
        }
    }
    Ok(())
}

fn dispatch<A: Actor>(
    definition: &Definition<A>,
    actor: &mut A,
    ctx: &mut Context<'_>,
    target: &Target,
) -> Outcome {
    match target {
        Target::Method(name) => {
            let method = definition.method(name).ok_or_else(|| {
                Halt::Violation(ContractViolation::UnknownMethod {
                    actor: definition.name().to_string(),
                    method: (*name).to_string(),
                })
            })?;
            method(actor, ctx)
        }
        Target::Actor(nested) => {
            ctx.run_nested(nested)?;
            Ok(())
        }
        Target::Inline(f) => f(ctx.state_mut()),
    }
}
