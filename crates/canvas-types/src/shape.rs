//! Lenient readers over decoded JSON.
//!
//! Agent snapshots are sparse and loosely typed. These helpers read a field
//! only when it has the expected JSON shape and report `None` otherwise, so
//! callers can fall back to the value they already hold.

use serde_json::{Map, Value};

/// Keys every checklist entry must expose to be merged by id.
pub const CHECKLIST_KEYS: &[&str] = &["id", "text"];

/// Keys every chart metric must expose to be merged by id.
pub const METRIC_KEYS: &[&str] = &["id"];

/// Read a string field.
pub fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Read a boolean field. Truthy non-booleans do not count.
pub fn bool_field(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

/// Read a monotonic counter field, see [`counter_value`].
pub fn counter_field(map: &Map<String, Value>, key: &str) -> u64 {
    map.get(key).map_or(0, counter_value)
}

/// Interpret a JSON value as a non-negative counter.
///
/// Non-numeric, negative, and non-finite values read as 0. Fractional values
/// are truncated.
pub fn counter_value(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}

/// Interpret a JSON value as a signed index, if it is a number at all.
pub fn index_value(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Read an array field as a list of strings, skipping non-string elements.
pub fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|entries| {
        entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect()
    })
}

/// Returns `true` if `value` is an array of objects that all carry a string
/// `id` and every key in `keys`.
///
/// An empty array qualifies.
pub fn is_keyed_list(value: &Value, keys: &[&str]) -> bool {
    value.as_array().is_some_and(|entries| {
        entries.iter().all(|entry| {
            entry.as_object().is_some_and(|obj| {
                obj.get("id").is_some_and(Value::is_string)
                    && keys.iter().all(|k| obj.contains_key(*k))
            })
        })
    })
}

/// The entries of a keyed list, or `None` if `value` is not one.
pub fn keyed_entries<'a>(value: &'a Value, keys: &[&str]) -> Option<Vec<&'a Map<String, Value>>> {
    if !is_keyed_list(value, keys) {
        return None;
    }
    value
        .as_array()
        .map(|entries| entries.iter().filter_map(Value::as_object).collect())
}

/// Coerce any JSON value to display text. `null` becomes the empty string.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Short name of a JSON value's kind, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
