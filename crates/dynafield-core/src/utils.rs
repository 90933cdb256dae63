//! Small helpers shared across modules: UUIDs, JSON diffing and merging

use serde_json::{Map, Value};
use uuid::Uuid;

/// Time-ordered UUID used for descriptor and schema ids
pub fn uuid_7() -> Uuid {
    Uuid::now_v7()
}

pub fn is_valid_uuid(value: &str) -> bool {
    get_valid_uuid(value).is_some()
}

/// Parse any textual UUID form (hyphenated, simple, braced, urn)
pub fn get_valid_uuid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

/// True for `None` or whitespace-only strings
pub fn is_string_empty(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Keys of `new` whose values differ from `old`
///
/// Nested objects are diffed recursively and only kept when something inside
/// changed. Keys missing from `new` are reported as `null`.
pub fn recursive_diff(old: &Map<String, Value>, new: &Map<String, Value>, exclude: &[&str]) -> Map<String, Value> {
    let mut result = Map::new();
    let keys = old.keys().chain(new.keys().filter(|k| !old.contains_key(*k)));

    for key in keys {
        if exclude.contains(&key.as_str()) {
            continue;
        }
        match (old.get(key), new.get(key)) {
            (Some(Value::Object(a)), Some(Value::Object(b))) => {
                let nested = recursive_diff(a, b, &[]);
                if !nested.is_empty() {
                    result.insert(key.clone(), Value::Object(nested));
                }
            }
            (Some(a), Some(b)) => {
                if a != b {
                    result.insert(key.clone(), b.clone());
                }
            }
            (None, Some(b)) => {
                result.insert(key.clone(), b.clone());
            }
            (Some(_), None) => {
                result.insert(key.clone(), Value::Null);
            }
            (None, None) => {}
        }
    }

    result
}

/// Recursive object merge where `overlay` wins
///
/// Nested objects merge key by key, arrays and scalars are replaced, and a
/// `null` in `overlay` never clears a value from `base`.
pub fn merge_json(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (key, incoming) in b {
                let next = match (a.get(key), incoming) {
                    (Some(current), Value::Null) => current.clone(),
                    (Some(current), incoming) => merge_json(current, incoming),
                    (None, incoming) => incoming.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (current, Value::Null) => current.clone(),
        (_, incoming) => incoming.clone(),
    }
}
