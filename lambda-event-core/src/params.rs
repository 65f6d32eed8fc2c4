//! Translation of snake_case parameter maps into the PascalCase payloads the
//! Lambda API expects.

use convert_case::{Case, Casing};
use serde_json::{Map, Value};

/// PascalCase-keyed payload for an SDK call.
pub type ApiParams = Map<String, Value>;

/// `statement_id` -> `StatementId`. Only underscores delimit words.
pub fn pascal_case(key: &str) -> String {
    key.from_case(Case::Snake).to_case(Case::Pascal)
}

/// Convert keys to PascalCase, dropping entries whose value is falsy.
pub fn to_api_params(params: &Map<String, Value>) -> ApiParams {
    params
        .iter()
        .filter(|(_, value)| !is_falsy(value))
        .map(|(key, value)| (pascal_case(key), value.clone()))
        .collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// String-valued field of a payload, if present.
pub fn param_str(params: &ApiParams, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}
