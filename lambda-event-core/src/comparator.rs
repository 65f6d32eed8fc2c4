//! Order-independent structural equality over JSON-like values.
//!
//! Maps compare by key set and per-key value; sequences compare as multisets,
//! so element order never matters at any depth. Used only to decide whether an
//! existing configuration already matches the desired one.

use serde::Serialize;
use serde_json::Value;

/// Canonical, totally ordered form of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Canonical {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    Seq(Vec<Canonical>),
    Map(Vec<(String, Canonical)>),
}

/// Canonicalize `value`, sorting map entries by key and sequence elements by
/// their own canonical form.
pub fn canonicalize(value: &Value) -> Canonical {
    match value {
        Value::Null => Canonical::Null,
        Value::Bool(b) => Canonical::Bool(*b),
        Value::Number(n) => Canonical::Number(n.to_string()),
        Value::String(s) => Canonical::String(s.clone()),
        Value::Array(items) => {
            let mut items: Vec<Canonical> = items.iter().map(canonicalize).collect();
            items.sort();
            Canonical::Seq(items)
        }
        Value::Object(fields) => {
            let mut fields: Vec<(String, Canonical)> = fields
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            fields.sort();
            Canonical::Map(fields)
        }
    }
}

pub fn equivalent(a: &Value, b: &Value) -> bool {
    canonicalize(a) == canonicalize(b)
}

/// Compare two serializable values through their JSON form.
pub fn same_configuration<T: Serialize>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => equivalent(&a, &b),
        _ => false,
    }
}
