//! Per-actor registry of declared input and output fields.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::core::kind::Kind;
use crate::core::resolvable::Resolvable;
use crate::state::{ERRORS, State};

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Declaration of one field, before it is registered under a name.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    kinds: Vec<Kind>,
    optional: Resolvable<bool>,
    default: Option<Resolvable<Value>>,
    problems: Vec<String>,
}

impl FieldSpec {
    /// Required field accepting a single kind.
    pub fn new(kind: Kind) -> Self {
        Self {
            kinds: vec![kind],
            optional: Resolvable::Static(false),
            default: None,
            problems: Vec::new(),
        }
    }

    /// Required field accepting any of `kinds`.
    pub fn kinds(kinds: impl IntoIterator<Item = Kind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::new(Kind::Any)
        }
    }

    /// Accept one more kind.
    pub fn or(mut self, kind: Kind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Accept values valid against a JSON Schema. A schema that fails to
    /// compile is recorded as a declaration problem.
    pub fn schema(mut self, title: impl Into<String>, schema: &Value) -> Self {
        match Kind::schema(title, schema) {
            Ok(kind) => self.kinds.push(kind),
            Err(problem) => self.problems.push(problem),
        }
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Resolvable::Static(optional);
        self
    }

    /// Optionality decided from the state at validation time.
    pub fn optional_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&State) -> bool + Send + Sync + 'static,
    {
        self.optional = Resolvable::computed(predicate);
        self
    }

    /// Static default. `null` counts as no default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = (!value.is_null()).then_some(Resolvable::Static(value));
        self
    }

    /// Default computed from the state at the moment defaults are applied.
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&State) -> Value + Send + Sync + 'static,
    {
        self.default = Some(Resolvable::computed(f));
        self
    }
}

/// A registered field: name, kind-set, optionality and default.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kinds: Vec<Kind>,
    pub optional: Resolvable<bool>,
    pub default: Option<Resolvable<Value>>,
}

/// Ordered set of fields for one direction (inputs or outputs).
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Register `spec` under `name`, returning any declaration problems.
    ///
    /// Re-declaring a name replaces the earlier field but keeps its position.
    pub fn declare(&mut self, name: &str, spec: FieldSpec) -> Vec<String> {
        let mut problems = spec.problems;
        if let Some(problem) = check_field_name(name) {
            problems.push(problem);
        }
        if spec.kinds.is_empty() {
            problems.push(format!("field {name} declares no kinds"));
        }

        let field = Field {
            name: name.to_string(),
            kinds: spec.kinds,
            optional: spec.optional,
            default: spec.default,
        };
        match self.fields.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        problems
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn check_field_name(name: &str) -> Option<String> {
    if name == ERRORS {
        return Some(format!("field name '{ERRORS}' is reserved"));
    }
    if !FIELD_NAME_RE.is_match(name) {
        return Some(format!("field name '{name}' is not an identifier"));
    }
    None
}
