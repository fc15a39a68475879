use serde_json::Value;

use crate::util::{parse_index, parse_json_pointer};

/// Get a value from a JSON document by path.
///
/// Returns `None` as soon as traversal reaches `null`, a scalar, a missing key,
/// an out-of-range index, or a non-numeric step on an array. An explicit `null`
/// at the final step is returned as `Some(&Value::Null)`.
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                current = arr.get(parse_index(path_step)?)?;
            }
            Value::Object(map) => {
                current = map.get(path_step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Get a mutable reference to a value in a JSON document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = val;
    for path_step in path {
        match current {
            Value::Array(arr) => {
                current = arr.get_mut(parse_index(path_step)?)?;
            }
            Value::Object(map) => {
                current = map.get_mut(path_step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Get a value by pointer string.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::get_by_pointer;
/// use serde_json::json;
///
/// let doc = json!({"todos": [{"title": "a"}, {"title": "b"}]});
/// assert_eq!(get_by_pointer(&doc, "/todos/1/title"), Some(&json!("b")));
/// assert_eq!(get_by_pointer(&doc, "/todos/9/title"), None);
/// assert_eq!(get_by_pointer(&doc, ""), Some(&doc));
/// ```
pub fn get_by_pointer<'a>(val: &'a Value, pointer: &str) -> Option<&'a Value> {
    get(val, &parse_json_pointer(pointer))
}
