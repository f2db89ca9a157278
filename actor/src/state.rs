//! The shared, dynamically shaped record every actor reads and writes.
//!
//! A [`State`] is an open bag of named JSON values plus a dedicated error
//! list. Schema fields are never pre-declared on the state itself; actors
//! read and write whatever names they need.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

/// Plain field mapping used to seed or extend a [`State`].
pub type Fields = Map<String, Value>;

/// Name of the distinguished error sequence.
pub const ERRORS: &str = "errors";

/// Field values and accumulated error messages for one call tree.
///
/// A field is *absent* when its key is missing or holds `null`. Every other
/// value, including `false`, `0` and empty strings or collections, is present.
#[derive(Clone, Default, PartialEq)]
pub struct State {
    fields: Fields,
    errors: Vec<String>,
}

impl State {
    /// Create an empty state with no fields and no errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a seed into a state.
    ///
    /// A `State` is returned unchanged; plain maps are wrapped with an empty
    /// error list.
    pub fn normalize(seed: impl Into<State>) -> State {
        seed.into()
    }

    /// Overlay `other` onto `self`. Right-hand fields win; errors are
    /// concatenated left then right.
    pub fn merge(mut self, other: State) -> State {
        self.fields.extend(other.fields);
        self.errors.extend(other.errors);
        self
    }

    /// Overlay a plain field map. An `errors` array in `fields` is appended
    /// to the existing errors instead of replacing them.
    pub fn merge_fields(mut self, mut fields: Fields) -> State {
        if let Some(extra) = fields.remove(ERRORS) {
            match extra {
                Value::Array(items) => self.errors.extend(items.iter().map(render_message)),
                Value::Null => {}
                other => self.errors.push(render_message(&other)),
            }
        }
        self.fields.extend(fields);
        self
    }

    pub fn success(&self) -> bool {
        !self.failure()
    }

    pub fn failure(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Read a field. Missing fields read as `None`, never as an error.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Write a field, creating it if needed.
    ///
    /// Writing `errors` replaces the error list when given an array; any
    /// other value is ignored so the list never degrades into a scalar.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if name == ERRORS {
            match value {
                Value::Array(items) => self.errors = items.iter().map(render_message).collect(),
                other => warn!(value = %other, "ignoring non-array write to errors"),
            }
            return;
        }
        self.fields.insert(name, value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// True when the field is missing or `null`.
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.get(name), None | Some(Value::Null))
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Snapshot as a JSON object including `errors`.
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(
            ERRORS.to_string(),
            Value::Array(self.errors.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(object)
    }
}

fn render_message(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

impl From<Fields> for State {
    fn from(mut fields: Fields) -> Self {
        fields.remove(ERRORS);
        Self {
            fields,
            errors: Vec::new(),
        }
    }
}

/// Objects become fields; `null` and other scalars yield an empty state.
impl From<Value> for State {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => State::from(fields),
            _ => State::new(),
        }
    }
}

impl From<()> for State {
    fn from(_: ()) -> Self {
        State::new()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<State {}>", self.to_value())
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(ERRORS, &self.errors)?;
        map.end()
    }
}
