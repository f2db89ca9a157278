//! Accepted value shapes for declared fields.

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::Value;

/// One accepted value shape. A field's kind-set is a disjunction: a value
/// conforms when it matches any of the listed kinds.
#[derive(Clone)]
pub enum Kind {
    Null,
    Boolean,
    /// Whole numbers (`i64` or `u64` representable).
    Integer,
    /// Numbers with a fractional representation.
    Float,
    /// Any JSON number.
    Number,
    String,
    Array,
    Object,
    Any,
    /// Caller-supplied predicate with a display name.
    Custom {
        name: &'static str,
        check: fn(&Value) -> bool,
    },
    /// Value must validate against a compiled JSON Schema.
    Schema {
        title: String,
        validator: Arc<Validator>,
    },
}

impl Kind {
    pub fn custom(name: &'static str, check: fn(&Value) -> bool) -> Self {
        Kind::Custom { name, check }
    }

    /// Compile `schema` into a kind. Errors carry the compiler message.
    pub fn schema(title: impl Into<String>, schema: &Value) -> Result<Self, String> {
        let title = title.into();
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| format!("invalid schema for {title}: {err}"))?;
        Ok(Kind::Schema {
            title,
            validator: Arc::new(validator),
        })
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Kind::Null => value.is_null(),
            Kind::Boolean => value.is_boolean(),
            Kind::Integer => value.is_i64() || value.is_u64(),
            Kind::Float => value.is_f64(),
            Kind::Number => value.is_number(),
            Kind::String => value.is_string(),
            Kind::Array => value.is_array(),
            Kind::Object => value.is_object(),
            Kind::Any => true,
            Kind::Custom { check, .. } => check(value),
            Kind::Schema { validator, .. } => validator.is_valid(value),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Kind::Null => "Null",
            Kind::Boolean => "Boolean",
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::Number => "Number",
            Kind::String => "String",
            Kind::Array => "Array",
            Kind::Object => "Object",
            Kind::Any => "Any",
            Kind::Custom { name, .. } => name,
            Kind::Schema { title, .. } => title,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True if `value` matches at least one kind.
pub fn matches_any(kinds: &[Kind], value: &Value) -> bool {
    kinds.iter().any(|kind| kind.matches(value))
}

/// Render a kind-set the way validation messages show it: `[Integer, String]`.
pub fn kind_list(kinds: &[Kind]) -> String {
    let names: Vec<&str> = kinds.iter().map(Kind::name).collect();
    format!("[{}]", names.join(", "))
}
