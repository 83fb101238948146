//! JSON key recasing.
//!
//! Twirp's JSON wire convention is snake_case field names, while
//! application message types expect camelCase. This is a pure recursive
//! transform over a generic JSON value: object keys are rewritten, string
//! values, array order and nulls are untouched.

use serde_json::Value;

/// Recursively rewrite every object key from snake_case to camelCase.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (snake_to_camel(&key), camelize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        scalar => scalar,
    }
}

/// Recase one snake_case identifier. Leading underscores and already-camel
/// identifiers pass through unchanged.
fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for (i, c) in key.chars().enumerate() {
        if c == '_' && i > 0 {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
