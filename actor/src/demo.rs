//! Sample actors bundled with the CLI.

use std::sync::OnceLock;

use clap::ValueEnum;
use serde_json::json;

use idempotent_actor::{
    Actor, Context, ContractViolation, Definition, FieldSpec, Fields, Kind, Outcome, Runnable,
    Runtime, State, fail,
};

/// Actors the CLI can run by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoActor {
    /// Build a display name from `name`, `age` and `cool`.
    Greeting,
    /// Greet, then award a badge to adults unless `muted` is set.
    Onboarding,
    /// Refund `amount` (at most 100); `--recover` reverses it.
    Refund,
}

impl DemoActor {
    pub fn run(
        self,
        runtime: &Runtime,
        seed: State,
        extra: Fields,
        recover: bool,
    ) -> Result<State, ContractViolation> {
        match (self, recover) {
            (DemoActor::Greeting, false) => runtime.call::<Greeting>(seed, extra),
            (DemoActor::Greeting, true) => runtime.recover::<Greeting>(seed, extra),
            (DemoActor::Onboarding, false) => runtime.call::<Onboarding>(seed, extra),
            (DemoActor::Onboarding, true) => runtime.recover::<Onboarding>(seed, extra),
            (DemoActor::Refund, false) => runtime.call::<Refund>(seed, extra),
            (DemoActor::Refund, true) => runtime.recover::<Refund>(seed, extra),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            DemoActor::Greeting => "inputs: name?, age, cool=false; output: real_name",
            DemoActor::Onboarding => "runs greeting, award_badge when age >= 18, welcome unless muted",
            DemoActor::Refund => "inputs: amount; output: refunded; recover reverses",
        }
    }
}

#[derive(Default)]
pub struct Greeting;

impl Actor for Greeting {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Greeting>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .input("name", FieldSpec::new(Kind::String).optional(true))
                .input("age", FieldSpec::new(Kind::Integer))
                .input("cool", FieldSpec::new(Kind::Boolean).default(false))
                .output("real_name", FieldSpec::new(Kind::String))
                .build()
        })
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        let name = ctx.get_str("name").unwrap_or("anonymous").to_string();
        let real_name = if ctx.get_bool("cool").unwrap_or(false) {
            format!("Cool {name}")
        } else {
            name
        };
        ctx.set("real_name", real_name);
        Ok(())
    }
}

#[derive(Default)]
pub struct Onboarding;

impl Onboarding {
    fn award_badge(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.set("badge", json!({ "kind": "adult", "level": 1 }));
        Ok(())
    }
}

impl Actor for Onboarding {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Onboarding>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .method("award_badge", Onboarding::award_badge)
                .run_actor::<Greeting>()
                .run(
                    Runnable::new()
                        .method("award_badge")
                        .when(|state| state.get_i64("age").is_some_and(|age| age >= 18)),
                )
                .run(
                    Runnable::new()
                        .inline(|state| {
                            state.set("welcomed", true);
                            Ok(())
                        })
                        .unless(|state| state.get_bool("muted").unwrap_or(false)),
                )
                .build()
        })
    }
}

#[derive(Default)]
pub struct Refund;

impl Actor for Refund {
    fn definition() -> &'static Definition<Self> {
        static DEFINITION: OnceLock<Definition<Refund>> = OnceLock::new();
        DEFINITION.get_or_init(|| {
            Definition::builder()
                .input("amount", FieldSpec::new(Kind::Integer).or(Kind::Float))
                .output("refunded", FieldSpec::new(Kind::Boolean))
                .build()
        })
    }

    fn call(&mut self, ctx: &mut Context<'_>) -> Outcome {
        let amount = ctx.get("amount").and_then(|v| v.as_f64()).unwrap_or_default();
        if amount > 100.0 {
            return fail(format!("refund of {amount} exceeds the 100 limit"));
        }
        ctx.set("refunded", true);
        Ok(())
    }

    fn recover(&mut self, ctx: &mut Context<'_>) -> Outcome {
        ctx.set("refunded", false);
        ctx.set("reversed", true);
        Ok(())
    }
}
