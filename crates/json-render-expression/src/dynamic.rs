//! Dynamic values: a literal, or a reference into the state model written as
//! `{"$state": "/ptr"}`, `{"state": "/ptr"}` or the older `{"path": "/ptr"}`.
//!
//! Used for action params and validation args, which only ever read state.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::eval_ctx::StateRead;
use crate::util::{bare_key, expression_key};

/// Returns the referenced pointer if `value` is a state reference.
pub fn reference_pointer(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if let Some(Value::String(pointer)) = expression_key(map, "$state", &["state"]) {
        return Some(pointer);
    }
    match bare_key(map, "path", &["path"]) {
        Some(Value::String(pointer)) => Some(pointer),
        _ => None,
    }
}

/// Resolves one dynamic value. `None` means the reference did not resolve.
pub fn resolve_dynamic(value: &Value, state: &dyn StateRead) -> Option<Value> {
    match reference_pointer(value) {
        Some(pointer) => state.read(pointer).map(Cow::into_owned),
        None => Some(value.clone()),
    }
}

/// Resolves every entry of a map of dynamic values. Entries whose reference
/// does not resolve are left out.
pub fn resolve_dynamic_map(values: &Map<String, Value>, state: &dyn StateRead) -> Map<String, Value> {
    values
        .iter()
        .filter_map(|(key, value)| Some((key.clone(), resolve_dynamic(value, state)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literals_pass_through() {
        let state = json!({});
        assert_eq!(resolve_dynamic(&json!(5), &state), Some(json!(5)));
        assert_eq!(
            resolve_dynamic(&json!({"path": "/a", "extra": 1}), &state),
            Some(json!({"path": "/a", "extra": 1}))
        );
    }

    #[test]
    fn references_read_state() {
        let state = json!({"form": {"email": "a@b.co"}});
        assert_eq!(resolve_dynamic(&json!({"path": "/form/email"}), &state), Some(json!("a@b.co")));
        assert_eq!(resolve_dynamic(&json!({"$state": "/form/email"}), &state), Some(json!("a@b.co")));
        assert_eq!(resolve_dynamic(&json!({"state": "/form/email"}), &state), Some(json!("a@b.co")));
        assert_eq!(resolve_dynamic(&json!({"$state": "/nope"}), &state), None);
    }

    #[test]
    fn map_drops_unresolved_entries() {
        let state = json!({"id": 7});
        let params = json!({"id": {"$state": "/id"}, "gone": {"path": "/x"}, "kind": "user"});
        let resolved = resolve_dynamic_map(params.as_object().unwrap(), &state);
        assert_eq!(Value::Object(resolved), json!({"id": 7, "kind": "user"}));
    }
}
