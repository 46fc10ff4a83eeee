//! Control-character sanitizer for extracted values

use serde_json::Value;

/// True for NUL, C0 controls other than `\t`, `\n`, `\r`, and DEL
#[inline]
fn is_stripped(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// Remove control characters from a single string
pub fn sanitize_str(input: &str) -> String {
    input.chars().filter(|c| !is_stripped(*c)).collect()
}

/// Recursively sanitize every string leaf of a JSON value.
///
/// Keys, numbers, booleans and nulls pass through unchanged. Idempotent.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, sanitize(v))).collect()),
        other => other,
    }
}
