//! The actor contract, its immutable definition, and the state handle its
//! logic receives.

use std::ops::{Deref, DerefMut};

use crate::compose::{self, ActorRef, Runnable};
use crate::core::schema::{FieldSet, FieldSpec};
use crate::error::{ContractViolation, Failure, Outcome};
use crate::io::config::RuntimeConfig;
use crate::runtime::Runtime;
use crate::state::{Fields, State};

/// A method an actor exposes to its own composition steps.
pub type Method<A> = fn(&mut A, &mut Context<'_>) -> Outcome;

/// A unit of business logic with declared inputs, outputs and sub-steps.
///
/// A fresh instance is built with `Default` for every invocation, so fields
/// on the actor type are per-call scratch space. Everything shared across
/// calls lives in the [`Definition`] returned by [`Actor::definition`].
///
/// ```ignore
/// #[derive(Default)]
/// struct Greet;
///
/// impl Actor for Greet {
///     fn definition() -> &'static Definition<Self> {
///         static DEFINITION: OnceLock<Definition<Greet>> = OnceLock::new();
///         DEFINITION.get_or_init(|| {
///             Definition::builder()
///                 .input("name", FieldSpec::new(Kind::String))
///                 .output("greeting", FieldSpec::new(Kind::String))
///                 .build()
///         })
///     }
///
///     fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
///         let name = ctx.get_str("name").unwrap_or_default().to_string();
///         ctx.set("greeting", format!("Hello, {name}"));
///         Ok(())
///     }
/// }
///
/// let state = Greet::invoke(json!({ "name": "Ada" }))?;
/// ```
pub trait Actor: Default + 'static {
    /// The actor type's registry, built once and never mutated.
    fn definition() -> &'static Definition<Self>;

    /// Business logic. Runs only when input validation passed.
    ///
    /// Defaults to running the declared composition steps.
    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.compose(self)
    }

    /// Compensating action. Runs without any validation.
    fn recover(&mut self, ctx: &mut Context<'_>) -> Outcome {
        let _ = ctx;
        Ok(())
    }

    /// Run the full lifecycle with the default runtime.
    fn invoke(seed: impl Into<State>) -> Result<State, ContractViolation> {
        Runtime::default().call::<Self>(seed, Fields::new())
    }

    /// Run the full lifecycle, folding `extra` into the seed first.
    fn invoke_with(seed: impl Into<State>, extra: Fields) -> Result<State, ContractViolation> {
        Runtime::default().call::<Self>(seed, extra)
    }

    /// Run only the `recover` hook with the default runtime.
    fn invoke_recovery(seed: impl Into<State>, extra: Fields) -> Result<State, ContractViolation> {
        Runtime::default().recover::<Self>(seed, extra)
    }
}

/// Immutable registry for one actor type: field schemas, named methods and
/// composition steps in declaration order.
pub struct Definition<A> {
    name: String,
    inputs: FieldSet,
    outputs: FieldSet,
    methods: Vec<(&'static str, Method<A>)>,
    runnables: Vec<Runnable>,
    problems: Vec<String>,
}

impl<A: Actor> Definition<A> {
    pub fn builder() -> DefinitionBuilder<A> {
        DefinitionBuilder {
            definition: Definition {
                name: short_type_name::<A>().to_string(),
                inputs: FieldSet::default(),
                outputs: FieldSet::default(),
                methods: Vec::new(),
                runnables: Vec::new(),
                problems: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &FieldSet {
        &self.inputs
    }

    pub fn outputs(&self) -> &FieldSet {
        &self.outputs
    }

    pub fn runnables(&self) -> &[Runnable] {
        &self.runnables
    }

    pub fn method(&self, name: &str) -> Option<Method<A>> {
        self.methods
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, method)| *method)
    }

    /// Problems recorded while the definition was built.
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Fail if the declaration recorded any problems.
    pub fn ensure_valid(&self) -> Result<(), ContractViolation> {
        if self.problems.is_empty() {
            return Ok(());
        }
        Err(ContractViolation::InvalidDeclaration {
            actor: self.name.clone(),
            problems: self.problems.clone(),
        })
    }
}

/// Declaration-time builder for a [`Definition`].
pub struct DefinitionBuilder<A> {
    definition: Definition<A>,
}

impl<A: Actor> DefinitionBuilder<A> {
    /// Override the display name used in logs and violations.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.definition.name = name.into();
        self
    }

    pub fn input(mut self, name: &str, spec: FieldSpec) -> Self {
        let problems = self.definition.inputs.declare(name, spec);
        self.record(problems.into_iter().map(|p| format!("input {name}: {p}")));
        self
    }

    pub fn output(mut self, name: &str, spec: FieldSpec) -> Self {
        let problems = self.definition.outputs.declare(name, spec);
        self.record(problems.into_iter().map(|p| format!("output {name}: {p}")));
        self
    }

    /// Expose `method` to composition steps under `name`.
    pub fn method(mut self, name: &'static str, method: Method<A>) -> Self {
        if self.definition.method(name).is_some() {
            self.definition
                .problems
                .push(format!("method {name} registered twice"));
        } else {
            self.definition.methods.push((name, method));
        }
        self
    }

    /// Append a composition step. Steps run in declaration order.
    pub fn run(mut self, runnable: Runnable) -> Self {
        if runnable.targets().is_empty() {
            let index = self.definition.runnables.len();
            self.definition
                .problems
                .push(format!("run step {index} declares no targets"));
        }
        self.definition.runnables.push(runnable);
        self
    }

    /// Shorthand for an unguarded step running one nested actor.
    pub fn run_actor<B: Actor>(self) -> Self {
        self.run(Runnable::new().actor::<B>())
    }

    /// Shorthand for an unguarded step running one registered method.
    pub fn run_method(self, name: &'static str) -> Self {
        self.run(Runnable::new().method(name))
    }

    /// Shorthand for an unguarded step running one inline closure.
    pub fn run_inline<F>(self, f: F) -> Self
    where
        F: Fn(&mut State) -> Outcome + Send + Sync + 'static,
    {
        self.run(Runnable::new().inline(f))
    }

    pub fn build(self) -> Definition<A> {
        self.definition
    }

    fn record(&mut self, problems: impl Iterator<Item = String>) {
        self.definition.problems.extend(problems);
    }
}

fn short_type_name<A>() -> &'static str {
    let full = std::any::type_name::<A>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Explicit handle to the shared state, passed to every hook and method.
///
/// Dereferences to [`State`], so `ctx.get(..)` and `ctx.set(..)` read and
/// write the one state of the current call tree.
pub struct Context<'a> {
    state: &'a mut State,
    config: &'a RuntimeConfig,
    depth: usize,
}

impl<'a> Context<'a> {
    pub(crate) fn new(state: &'a mut State, config: &'a RuntimeConfig, depth: usize) -> Self {
        Self {
            state,
            config,
            depth,
        }
    }

    pub fn state(&self) -> &State {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut *self.state
    }

    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    /// Nesting depth of the actor this context belongs to (0 at the top).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `actor`'s declared composition steps against this state.
    pub fn compose<A: Actor>(&mut self, actor: &mut A) -> Outcome {
        compose::run_steps(A::definition(), actor, self)
    }

    /// Run nested actor `B`'s full lifecycle against this state.
    pub fn invoke<B: Actor>(&mut self) -> Result<(), ContractViolation> {
        self.run_nested(&ActorRef::of::<B>())
    }

    pub(crate) fn run_nested(&mut self, nested: &ActorRef) -> Result<(), ContractViolation> {
        nested.run(&mut *self.state, self.config, self.depth + 1)
    }

    /// Read a field and convert it, treating absent and mistyped values alike.
    pub fn read<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.state
            .get(name)
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Write any serializable value as a field.
    ///
    /// A value that cannot be represented as JSON leaves the field untouched
    /// and stops the actor with a declared failure.
    pub fn write<T: serde::Serialize>(&mut self, name: &str, value: T) -> Outcome {
        let value = serde_json::to_value(value)
            .map_err(|err| Failure::new(format!("cannot write {name}: {err}")))?;
        self.state.set(name, value);
        Ok(())
    }
}

impl Deref for Context<'_> {
    type Target = State;

    fn deref(&self) -> &State {
        &*self.state
    }
}

impl DerefMut for Context<'_> {
    fn deref_mut(&mut self) -> &mut State {
        &mut *self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kind::Kind;
    use crate::error::Halt;
    use std::sync::OnceLock;

    #[derive(Default)]
    struct Plain;

    impl Actor for Plain {
        fn definition() -> &'static Definition<Self> {
            static DEFINITION: OnceLock<Definition<Plain>> = OnceLock::new();
            DEFINITION.get_or_init(|| Definition::builder().build())
        }
    }

    fn noop(_: &mut Plain, _: &mut Context<'_>) -> Outcome {
        Ok(())
    }

    #[test]
    fn default_name_is_short_type_name() {
        assert_eq!(Plain::definition().name(), "Plain");
    }

    #[test]
    fn builder_collects_declaration_problems() {
        let definition = Definition::<Plain>::builder()
            .named("Broken")
            .input("errors", FieldSpec::new(Kind::Array))
            .method("noop", noop)
            .method("noop", noop)
            .run(Runnable::new())
            .build();

        let problems = definition.problems();
        assert_eq!(problems.len(), 3);
        assert!(problems[0].starts_with("input errors:"));
        assert!(problems[1].contains("registered twice"));
        assert!(problems[2].contains("no targets"));

        let err = definition.ensure_valid().expect_err("invalid");
        assert!(matches!(
            err,
            ContractViolation::InvalidDeclaration { ref actor, .. } if actor == "Broken"
        ));
    }

    #[test]
    fn method_lookup_by_name() {
        let definition = Definition::<Plain>::builder().method("noop", noop).build();
        assert!(definition.method("noop").is_some());
        assert!(definition.method("other").is_none());
    }

    #[test]
    fn context_reads_and_writes_typed_values() {
        let mut state = State::new();
        let config = RuntimeConfig::default();
        let mut ctx = Context::new(&mut state, &config, 0);

        ctx.write("tags", vec!["a", "b"]).expect("write tags");
        let tags: Option<Vec<String>> = ctx.read("tags");
        assert_eq!(tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(ctx.read::<u32>("tags"), None);
        assert_eq!(ctx.read::<u32>("missing"), None);
    }

    #[test]
    fn unserializable_write_fails_and_leaves_field_untouched() {
        use std::collections::BTreeMap;

        let mut state = State::new();
        state.set("payload", 1);
        let config = RuntimeConfig::default();
        let mut ctx = Context::new(&mut state, &config, 0);

        // JSON object keys must be strings; byte-vector keys are rejected.
        let payload: BTreeMap<Vec<u8>, u8> = BTreeMap::from([(vec![1, 2], 3)]);
        let outcome = ctx.write("payload", payload);

        let Err(Halt::Failed(failure)) = &outcome else {
            panic!("expected declared failure, got {outcome:?}");
        };
        assert!(failure.message.starts_with("cannot write payload:"));
        assert_eq!(ctx.get_i64("payload"), Some(1));
    }

    #[derive(Default)]
    struct Exporter;

    impl Actor for Exporter {
        fn definition() -> &'static Definition<Self> {
            static DEFINITION: OnceLock<Definition<Exporter>> = OnceLock::new();
            DEFINITION.get_or_init(|| {
                Definition::builder()
                    .output("payload", FieldSpec::new(Kind::Object))
                    .build()
            })
        }

        fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
            let payload: std::collections::BTreeMap<Vec<u8>, u8> =
                std::collections::BTreeMap::from([(vec![0], 1)]);
            ctx.write("payload", payload)?;
            ctx.set("exported", true);
            Ok(())
        }
    }

    #[test]
    fn failed_write_surfaces_as_state_error() {
        let state = Exporter::invoke(()).expect("invoke");
        assert!(state.failure());
        assert_eq!(state.errors().len(), 1);
        assert!(state.errors()[0].starts_with("cannot write payload:"));
        assert!(!state.contains("payload"));
        assert!(!state.contains("exported"));
    }

    #[test]
    fn plain_actor_succeeds_with_empty_errors() {
        let state = Plain::invoke(()).expect("invoke");
        assert!(state.success());
        assert!(state.errors().is_empty());
    }
}
