//! Coerces loosely-structured model output into a JSON object.

use serde_json::{Map, Value};

/// Returns the object spanning the first `{` to the last `}` in `text`.
///
/// Anything that does not yield a JSON object (no braces, braces out of
/// order, invalid JSON, a non-object value) yields an empty map. Never fails.
pub fn extract_json_map(text: &str) -> Map<String, Value> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Map::new();
    };
    if end < start {
        return Map::new();
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
