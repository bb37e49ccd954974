//! Caller argument coercion.

use crate::error::{CoordinatorError, CoordinatorResult};
use serde_json::Value;

/// Coerce the caller's `data` field into the ordered string list chaincode expects.
///
/// Absent or `null` data is an empty list. Array elements may be strings
/// (kept verbatim), numbers or booleans (rendered as text). Anything else
/// has no unambiguous string form.
pub fn coerce_args(data: &Value) -> CoordinatorResult<Vec<String>> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                other => Err(CoordinatorError::InvalidArguments {
                    reason: format!("argument {index} is not a scalar: {other}"),
                }),
            })
            .collect(),
        other => Err(CoordinatorError::InvalidArguments {
            reason: format!("expected an array of arguments, got {}", kind_of(other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
