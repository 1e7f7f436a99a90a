/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Data values and the scope stack used during rendering.
//!
//! Data arrives as JSON or YAML and is converted into [`Value`], which is
//! independent of either format. Rendering reads values through a
//! [`ContextStack`]: the root data is the outermost scope and every loop
//! iteration pushes a fresh innermost scope.

use std::collections::BTreeMap;

/// A string-keyed mapping of values.
pub type Scope = BTreeMap<String, Value>;

/// A data value visible to templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Scope),
}

impl Value {
    pub fn as_map(&self) -> Option<&Scope> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Truthiness for `<If cond="...">`.
    ///
    /// - Null, `false`, zero, and empty strings, lists and maps are false
    /// - strings `"false"`, `"0"`, `"no"` and `"off"` (any case) are false
    /// - everything else is true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || s.eq_ignore_ascii_case("false")
                    || s == "0"
                    || s.eq_ignore_ascii_case("no")
                    || s.eq_ignore_ascii_case("off"))
            }
            Value::List(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Render as cell text.
    ///
    /// Scalars use their natural display form (`true`, `42`, `3.5`); null is
    /// empty. Lists and maps have no meaningful text and render as their JSON
    /// form.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => serde_json::Value::from(self).to_string(),
        }
    }

    /// Wrap non-mapping data so it can serve as the root scope.
    ///
    /// A mapping is used as-is, null becomes an empty mapping, and anything
    /// else is exposed under the key `data`.
    pub fn into_root_scope(self) -> Scope {
        match self {
            Value::Map(m) => m,
            Value::Null => Scope::new(),
            other => {
                let mut scope = Scope::new();
                scope.insert("data".to_string(), other);
                scope
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Scope> for Value {
    fn from(m: Scope) -> Self {
        Value::Map(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Value::Map(
                map.into_iter()
                    .filter_map(|(k, v)| yaml_key(k).map(|k| (k, Value::from(v))))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// Scalar YAML keys become strings; structured keys are dropped.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Null => Some("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => None,
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(m) => serde_json::Value::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Outer-to-inner list of scopes. Lookups search innermost first.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    scopes: Vec<Scope>,
}

impl ContextStack {
    pub fn new(root: Scope) -> Self {
        Self { scopes: vec![root] }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look up a dotted path, innermost scope first.
    ///
    /// A scope that lacks a segment, or holds a non-mapping value where a
    /// mapping is needed, does not match and the search moves outward.
    pub fn lookup(&self, segments: &[&str]) -> Option<&Value> {
        let (first, rest) = segments.split_first()?;
        self.scopes.iter().rev().find_map(|scope| {
            let mut current = scope.get(*first)?;
            for segment in rest {
                current = current.as_map()?.get(*segment)?;
            }
            Some(current)
        })
    }
}
