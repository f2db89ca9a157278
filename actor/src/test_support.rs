//! Test-only helpers for building seeds and observing execution order.

use serde_json::Value;

use crate::error::Outcome;
use crate::state::{Fields, State};

/// Field that [`mark`] appends labels to.
pub const TRACE: &str = "trace";

/// Convert a JSON object literal into a field map. Non-objects yield an empty map.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

/// Build a state from a JSON object literal.
pub fn state(value: Value) -> State {
    State::from(value)
}

/// Append `label` to the `trace` array field.
pub fn push_trace(state: &mut State, label: &str) {
    let mut labels = match state.remove(TRACE) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    labels.push(Value::String(label.to_string()));
    state.set(TRACE, Value::Array(labels));
}

/// Inline step that records `label` in the `trace` field.
pub fn mark(label: &'static str) -> impl Fn(&mut State) -> Outcome + Send + Sync + 'static {
    move |state| {
        push_trace(state, label);
        Ok(())
    }
}

/// Labels recorded so far, in order.
pub fn trace(state: &State) -> Vec<String> {
    state
        .get(TRACE)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
