//! In-place mutation by path: `set`, `add` and `remove`.
//!
//! None of these fail. A path that cannot be walked (for example a
//! non-numeric step on an array, or a step below a scalar that is not the
//! last one) leaves the document untouched past the point of failure.

use serde_json::{Map, Value};

use crate::util::{parse_index, parse_json_pointer};

/// Creates an empty container suited for `next_step`: an array when the step
/// is numeric or `-`, an object otherwise.
fn container_for(next_step: &str) -> Value {
    if next_step == "-" || parse_index(next_step).is_some() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Returns the slot addressed by `step` inside `parent`, creating it (as
/// `null`) when missing. An array index at or past the end appends, so the
/// array never grows by more than one slot per step.
fn slot<'a>(parent: &'a mut Value, step: &str) -> Option<&'a mut Value> {
    match parent {
        Value::Object(map) => Some(map.entry(step.to_string()).or_insert(Value::Null)),
        Value::Array(arr) => {
            if step == "-" {
                arr.push(Value::Null);
                return arr.last_mut();
            }
            let idx = parse_index(step)?;
            if idx >= arr.len() {
                arr.push(Value::Null);
                return arr.last_mut();
            }
            arr.get_mut(idx)
        }
        _ => None,
    }
}

/// Walks to the parent of the last step, creating missing or non-container
/// intermediates along the way.
fn walk_creating<'a>(doc: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let (_, parents) = path.split_last()?;
    let mut current = doc;
    for (i, step) in parents.iter().enumerate() {
        let next = &path[i + 1];
        let child = slot(current, step)?;
        if !child.is_object() && !child.is_array() {
            *child = container_for(next);
        }
        current = child;
    }
    Some(current)
}

/// Sets `value` at `path`, creating intermediate containers as needed.
///
/// On an array the last step overwrites the element at a numeric index
/// or appends on `-` and on any index past the end. An empty path
/// replaces the whole document.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::set_by_pointer;
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set_by_pointer(&mut doc, "/user/tags/-", json!("a"));
/// set_by_pointer(&mut doc, "/user/name", json!("Ada"));
/// assert_eq!(doc, json!({"user": {"tags": ["a"], "name": "Ada"}}));
/// ```
pub fn set(doc: &mut Value, path: &[String], value: Value) {
    let Some(last) = path.last() else {
        *doc = value;
        return;
    };
    let Some(parent) = walk_creating(doc, path) else {
        return;
    };
    if let Some(target) = slot(parent, last) {
        *target = value;
    }
}

/// RFC 6902 `add`: creates or replaces an object member, inserts into an
/// array before the given index (shifting later elements) or appends on `-`.
///
/// An index past the end appends. Missing intermediates are created the same
/// way as in [`set`], and an empty path replaces the whole document.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::add_by_pointer;
/// use serde_json::json;
///
/// let mut doc = json!({"arr": [1, 2, 3]});
/// add_by_pointer(&mut doc, "/arr/1", json!(99));
/// assert_eq!(doc, json!({"arr": [1, 99, 2, 3]}));
/// ```
pub fn add(doc: &mut Value, path: &[String], value: Value) {
    let Some(last) = path.last() else {
        *doc = value;
        return;
    };
    let Some(parent) = walk_creating(doc, path) else {
        return;
    };
    match parent {
        Value::Object(map) => {
            map.insert(last.clone(), value);
        }
        Value::Array(arr) => {
            if last == "-" {
                arr.push(value);
            } else if let Some(idx) = parse_index(last) {
                if idx >= arr.len() {
                    arr.push(value);
                } else {
                    arr.insert(idx, value);
                }
            }
        }
        _ => {}
    }
}

/// Removes the value at `path`, returning it.
///
/// Deletes an object member or splices an array element out. Returns `None`
/// and leaves the document untouched when the path does not resolve; the root
/// itself cannot be removed.
pub fn remove(doc: &mut Value, path: &[String]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    match crate::get_mut(doc, parents)? {
        Value::Object(map) => map.remove(last),
        Value::Array(arr) => {
            let idx = parse_index(last)?;
            if idx < arr.len() {
                Some(arr.remove(idx))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// [`set`] with a pointer string.
pub fn set_by_pointer(doc: &mut Value, pointer: &str, value: Value) {
    set(doc, &parse_json_pointer(pointer), value)
}

/// [`add`] with a pointer string.
pub fn add_by_pointer(doc: &mut Value, pointer: &str, value: Value) {
    add(doc, &parse_json_pointer(pointer), value)
}

/// [`remove`] with a pointer string.
pub fn remove_by_pointer(doc: &mut Value, pointer: &str) -> Option<Value> {
    remove(doc, &parse_json_pointer(pointer))
}
