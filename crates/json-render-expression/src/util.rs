//! Value helpers shared by every expression family.

use serde_json::{Map, Value};

use crate::eval_ctx::StateRead;

// ----------------------------------------------------------------- Type helpers

/// Dynamic-language truthiness.
///
/// Missing, `null`, `false`, `0`, `NaN` and `""` are falsy. Every array and
/// object is truthy, including empty ones.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Returns the value as `f64` only if it is a JSON number.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

/// Returns the value as `f64` if it is a number or a string holding one.
///
/// Blank strings are not numeric.
pub fn as_numeric(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
        }
        _ => None,
    }
}

// --------------------------------------------------------------- Discriminators

/// Reads the bare spelling of an expression key (`state` next to `$state`).
///
/// The bare key only counts when every key of `map` belongs to the
/// expression, so an ordinary object like `{"state": "CA", "zip": "94110"}`
/// stays a literal.
pub(crate) fn bare_key<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    allowed: &[&str],
) -> Option<&'a Value> {
    let value = map.get(key)?;
    map.keys()
        .all(|k| allowed.contains(&k.as_str()))
        .then_some(value)
}

/// `$key`, falling back to the bare `key` under the rules of [`bare_key`].
pub(crate) fn expression_key<'a>(
    map: &'a Map<String, Value>,
    tagged: &str,
    allowed: &[&str],
) -> Option<&'a Value> {
    map.get(tagged).or_else(|| {
        let bare = tagged.strip_prefix('$')?;
        bare_key(map, bare, allowed)
    })
}

// --------------------------------------------------------------- String helpers

/// Formats a number the way it reads in UI text: integral floats drop the
/// trailing `.0`.
fn number_to_string(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// Converts a value to display text.
///
/// `null` renders as the empty string; arrays and objects render as JSON.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Replaces every `${pointer}` placeholder in `text` with the stringified value
/// found at that pointer in `state`.
///
/// Unresolved pointers become the empty string. An unterminated `${` and the
/// empty placeholder `${}` are left as written.
///
/// # Example
///
/// ```
/// use json_render_expression::util::interpolate;
/// use serde_json::json;
///
/// let state = json!({"user": {"name": "Ada"}, "count": 3.0});
/// assert_eq!(interpolate("Hi ${/user/name}, ${/count} new", &state), "Hi Ada, 3 new");
/// assert_eq!(interpolate("Missing: [${/nope}]", &state), "Missing: []");
/// ```
pub fn interpolate(text: &str, state: &dyn StateRead) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(0) => {
                out.push_str("${}");
                rest = &after[1..];
            }
            Some(end) => {
                if let Some(value) = state.read(&after[..end]) {
                    out.push_str(&to_display_string(&value));
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
