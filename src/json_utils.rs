//! Accessors for Reddit's listing envelope: `{"data": {"children": [...], "after": ...}}`
//! and the per-node `{"kind": "...", "data": {...}}` wrapper.

use serde_json::Value;

/// Child nodes of a listing envelope, if the shape matches.
pub fn listing_children(v: &Value) -> Option<&Vec<Value>> {
    v.get("data")?.get("children")?.as_array()
}

/// Forward cursor of a listing envelope. `null` and empty string both mean
/// "no further pages".
pub fn listing_after(v: &Value) -> Option<String> {
    let after = v.get("data")?.get("after")?.as_str()?;
    if after.is_empty() {
        None
    } else {
        Some(after.to_string())
    }
}

/// The `kind` tag of a listing node ("t1" comment, "t3" post, "more", ...).
pub fn node_kind(v: &Value) -> Option<&str> {
    v.get("kind")?.as_str()
}

/// The payload of a listing node.
pub fn node_data(v: &Value) -> Option<&Value> {
    v.get("data")
}

/// String field with empty-string default (Reddit omits many fields).
pub fn str_or_empty(v: &Value, key: &str) -> String {
    v.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Nullable string field, kept as `None` when absent or JSON null.
pub fn str_or_null(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numeric field with zero default.
pub fn f64_or_zero(v: &Value, key: &str) -> f64 {
    v.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Integer field with zero default.
pub fn i64_or_zero(v: &Value, key: &str) -> i64 {
    v.get(key).and_then(Value::as_i64).unwrap_or(0)
}
