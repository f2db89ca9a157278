//! Composition tests: ordering, guards, nested actors sharing one state,
//! and contract violations.

use std::sync::OnceLock;

use idempotent_actor::test_support::{mark, push_trace, trace};
use idempotent_actor::{
    Actor, Context, ContractViolation, Definition, FieldSpec, Fields, Kind, Outcome, Runnable,
    Runtime, RuntimeConfig, State, fail,
};
use serde_json::json;

#[derive(Default)]
struct Cool;

impl Actor for Cool {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Cool>> = OnceLock::new();
        DEFINITION.get_or_init(|| Definition::builder().build())
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.set("called", true);
        Ok(())
    }
}

/// One nested actor, one method and one inline closure.
#[derive(Default)]
struct Mixed;

impl Mixed {
    fn funny_method(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.set("funny", json!({ "haha": 25 }));
        Ok(())
    }
}

impl Actor for Mixed {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Mixed>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .method("funny_method", Mixed::funny_method)
                .run_actor::<Cool>()
                .run_method("funny_method")
                .run_inline(|state| {
                    state.set("among_us", "sus");
                    Ok(())
                })
                .build()
        })
    }
}

#[test]
fn runs_nested_actor() {
    let result = Mixed::invoke(()).expect("invoke");
    assert_eq!(result.get_bool("called"), Some(true));
}

#[test]
fn runs_registered_method() {
    let result = Mixed::invoke(()).expect("invoke");
    let funny = result.get("funny").expect("funny");
    assert!(funny.is_object());
    assert_eq!(funny["haha"], json!(25));
}

#[test]
fn runs_inline_closure() {
    let result = Mixed::invoke(()).expect("invoke");
    assert_eq!(result.get_str("among_us"), Some("sus"));
}

#[derive(Default)]
struct StepA;

impl Actor for StepA {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<StepA>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .output("token", FieldSpec::new(Kind::String))
                .build()
        })
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        push_trace(ctx, "a");
        ctx.set("token", "from-a");
        Ok(())
    }
}

#[derive(Default)]
struct StepB;

impl Actor for StepB {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<StepB>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .input("token", FieldSpec::new(Kind::String))
                .build()
        })
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        push_trace(ctx, "b");
        let seen = ctx.get_str("token").unwrap_or_default().to_string();
        ctx.set("seen_by_b", seen);
        Ok(())
    }
}

#[derive(Default)]
struct Pipeline;

impl Actor for Pipeline {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Pipeline>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .run_actor::<StepA>()
                .run_actor::<StepB>()
                .build()
        })
    }
}

#[test]
fn earlier_step_effects_are_visible_to_later_steps() {
    let result = Pipeline::invoke(()).expect("invoke");
    assert!(result.success());
    assert_eq!(trace(&result), vec!["a", "b"]);
    assert_eq!(result.get_str("seen_by_b"), Some("from-a"));
}

#[derive(Default)]
struct Gated;

impl Actor for Gated {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Gated>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .run(Runnable::new().inline(mark("always")))
                .run(
                    Runnable::new()
                        .inline(mark("when-1"))
                        .inline(mark("when-2"))
                        .when(|state| state.get_bool("enabled").unwrap_or(false)),
                )
                .run(
                    Runnable::new()
                        .inline(mark("unless-1"))
                        .inline(mark("unless-2"))
                        .unless(|state| state.get_bool("skip").unwrap_or(false)),
                )
                .build()
        })
    }
}

#[test]
fn unless_guard_skips_every_target() {
    let result = Gated::invoke(json!({ "skip": true })).expect("invoke");
    assert_eq!(trace(&result), vec!["always"]);
}

#[test]
fn when_guard_runs_all_targets_in_order() {
    let result = Gated::invoke(json!({ "enabled": true })).expect("invoke");
    assert_eq!(
        trace(&result),
        vec!["always", "when-1", "when-2", "unless-1", "unless-2"]
    );
}

#[test]
fn guards_see_state_written_by_earlier_steps() {
    #[derive(Default)]
    struct Toggle;

    impl Actor for Toggle {
        fn definition() -> &'static Definition<Self> {
            static DEFINITION: OnceLock<Definition<Toggle>> = OnceLock::new();
            DEFINITION.get_or_init(|| {
                Definition::builder()
                    .run_inline(|state| {
                        state.set("skip", true);
                        Ok(())
                    })
                    .run(
                        Runnable::new()
                            .inline(mark("late"))
                            .unless(|state| state.get_bool("skip").unwrap_or(false)),
                    )
                    .build()
            })
        }
    }

    let result = Toggle::invoke(()).expect("invoke");
    assert!(trace(&result).is_empty());
}

#[derive(Default)]
struct NeedsEmail;

impl Actor for NeedsEmail {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<NeedsEmail>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .input("email", FieldSpec::new(Kind::String))
                .build()
        })
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.set("emailed", true);
        Ok(())
    }
}

#[derive(Default)]
struct Signup;

impl Actor for Signup {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Signup>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .output("account", FieldSpec::new(Kind::Object))
                .run_actor::<NeedsEmail>()
                .run_inline(mark("after-nested"))
                .build()
        })
    }
}

#[test]
fn nested_validation_errors_surface_in_outer_state() {
    let result = Signup::invoke(()).expect("invoke");
    assert_eq!(result.errors(), ["Input email is required"]);
    assert!(!result.contains("emailed"));
    // Composition continues; the outer output phase is skipped because of the error.
    assert_eq!(trace(&result), vec!["after-nested"]);
}

#[derive(Default)]
struct Charge;

impl Charge {
    fn charge(&mut self, ctx: &mut Context<'_>) -> Outcome {
        if ctx.get_bool("declined").unwrap_or(false) {
            return fail("card declined");
        }
        ctx.set("charged", true);
        Ok(())
    }
}

impl Actor for Charge {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Charge>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .method("charge", Charge::charge)
                .run_method("charge")
                .run_inline(mark("receipt"))
                .build()
        })
    }
}

#[test]
fn declared_failure_in_method_stops_remaining_steps() {
    let result = Charge::invoke(json!({ "declined": true })).expect("invoke");
    assert_eq!(result.errors(), ["card declined"]);
    assert!(trace(&result).is_empty());
}

#[test]
fn method_success_continues_to_next_step() {
    let result = Charge::invoke(()).expect("invoke");
    assert!(result.success());
    assert_eq!(result.get_bool("charged"), Some(true));
    assert_eq!(trace(&result), vec!["receipt"]);
}

#[derive(Default)]
struct Typo;

impl Actor for Typo {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Typo>> = OnceLock::new();
        DEFINITION.get_or_init(|| Definition::builder().run_method("does_not_exist").build())
    }
}

#[test]
fn unknown_method_is_a_contract_violation() {
    let err = Typo::invoke(()).expect_err("violation");
    assert_eq!(
        err,
        ContractViolation::UnknownMethod {
            actor: "Typo".to_string(),
            method: "does_not_exist".to_string(),
        }
    );
}

#[derive(Default)]
struct CallsTypo;

impl Actor for CallsTypo {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<CallsTypo>> = OnceLock::new();
        DEFINITION.get_or_init(|| Definition::builder().run_actor::<Typo>().build())
    }
}

#[test]
fn nested_contract_violation_escapes_the_whole_tree() {
    let err = CallsTypo::invoke(()).expect_err("violation");
    assert!(matches!(err, ContractViolation::UnknownMethod { .. }));
}

#[derive(Default)]
struct Recursive;

impl Actor for Recursive {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Recursive>> = OnceLock::new();
        DEFINITION.get_or_init(|| Definition::builder().run_actor::<Recursive>().build())
    }
}

#[test]
fn runaway_nesting_is_a_contract_violation() {
    let runtime = Runtime::new(RuntimeConfig {
        max_depth: 4,
        ..RuntimeConfig::default()
    });
    let err = runtime
        .call::<Recursive>((), Fields::new())
        .expect_err("violation");
    assert_eq!(
        err,
        ContractViolation::NestingTooDeep {
            actor: "Recursive".to_string(),
            max_depth: 4,
        }
    );
}

/// Logic that composes explicitly and then adds its own work.
#[derive(Default)]
struct Wrapper {
    composed: bool,
}

impl Actor for Wrapper {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Wrapper>> = OnceLock::new();
        DEFINITION.get_or_init(|| Definition::builder().run_actor::<Cool>().build())
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.compose(self)?;
        self.composed = true;
        ctx.invoke::<StepA>()?;
        ctx.set("wrapped", self.composed);
        let depth = ctx.depth() as i64;
        ctx.set("depth_seen", depth);
        Ok(())
    }
}

#[test]
fn custom_call_can_compose_and_invoke_directly() {
    let result = Wrapper::invoke(State::new()).expect("invoke");
    assert!(result.success());
    assert_eq!(result.get_bool("called"), Some(true));
    assert_eq!(result.get_str("token"), Some("from-a"));
    assert_eq!(result.get_bool("wrapped"), Some(true));
    assert_eq!(result.get_i64("depth_seen"), Some(0));
}
