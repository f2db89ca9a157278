//! Validation pipeline run over a [`FieldSet`] for inputs and again for outputs.
//!
//! Stages run in a fixed order: defaults, requiredness, kinds. No stage
//! short-circuits: every field is checked and every violation is recorded
//! before the lifecycle decides whether to continue.

use std::fmt;

use tracing::debug;

use crate::core::kind::{kind_list, matches_any};
use crate::core::schema::FieldSet;
use crate::state::{ERRORS, State};

/// Which side of the actor a field set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("Input"),
            Direction::Output => f.write_str("Output"),
        }
    }
}

/// One validation step that runs against a state and may append errors.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn apply(&self, direction: Direction, fields: &FieldSet, state: &mut State);
}

/// Fill absent fields from their declared defaults.
pub struct ApplyDefaults;

impl Stage for ApplyDefaults {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn apply(&self, _direction: Direction, fields: &FieldSet, state: &mut State) {
        for field in fields.iter() {
            let Some(default) = &field.default else {
                continue;
            };
            if field.name == ERRORS {
                continue;
            }
            if !state.is_absent(&field.name) {
                continue;
            }
            let value = default.resolve(state);
            if !value.is_null() {
                state.set(field.name.clone(), value);
            }
        }
    }
}

/// Record every absent field that is not optional.
pub struct CheckRequired;

impl Stage for CheckRequired {
    fn name(&self) -> &'static str {
        "required"
    }

    fn apply(&self, direction: Direction, fields: &FieldSet, state: &mut State) {
        for field in fields.iter() {
            let optional = field.optional.resolve(state);
            if !optional && state.is_absent(&field.name) {
                state.add_error(format!("{direction} {} is required", field.name));
            }
        }
    }
}

/// Record every present field whose value matches none of its kinds.
pub struct CheckKinds;

impl Stage for CheckKinds {
    fn name(&self) -> &'static str {
        "kinds"
    }

    fn apply(&self, direction: Direction, fields: &FieldSet, state: &mut State) {
        for field in fields.iter() {
            let Some(value) = state.get(&field.name).filter(|value| !value.is_null()) else {
                continue;
            };
            if !matches_any(&field.kinds, value) {
                let message = format!(
                    "{direction} {} must be one of {}",
                    field.name,
                    kind_list(&field.kinds)
                );
                state.add_error(message);
            }
        }
    }
}

/// Stages in execution order.
pub const STAGES: [&dyn Stage; 3] = [&ApplyDefaults, &CheckRequired, &CheckKinds];

/// Run every stage over `fields`, returning how many errors were appended.
pub fn validate(direction: Direction, fields: &FieldSet, state: &mut State) -> usize {
    let before = state.errors().len();
    if fields.is_empty() {
        return 0;
    }
    for stage in STAGES {
        let start = state.errors().len();
        stage.apply(direction, fields, state);
        debug!(
            %direction,
            stage = stage.name(),
            appended = state.errors().len().saturating_sub(start),
            "validation stage finished"
        );
    }
    state.errors().len().saturating_sub(before)
}
