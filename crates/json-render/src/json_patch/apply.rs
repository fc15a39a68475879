//! Patch application.
//!
//! Every operation except `test` is total: paths that do not resolve are
//! created (`add`, `replace`) or ignored (`remove`, `move`, `copy`).

use json_render_json_pointer::{add_by_pointer, get_by_pointer, remove_by_pointer, set_by_pointer};
use json_render_util::deep_equal_opt;
use serde_json::Value;

use super::types::{Op, PatchError};

fn apply_move(doc: &mut Value, path: &str, from: &str) {
    if path == from {
        return;
    }
    if let Some(value) = remove_by_pointer(doc, from) {
        add_by_pointer(doc, path, value);
    }
}

fn apply_copy(doc: &mut Value, path: &str, from: &str) {
    if let Some(value) = get_by_pointer(doc, from).cloned() {
        add_by_pointer(doc, path, value);
    }
}

/// `None` asserts that nothing is at `path`.
fn apply_test(doc: &Value, path: &str, value: Option<&Value>) -> Result<(), PatchError> {
    if deep_equal_opt(get_by_pointer(doc, path), value) {
        Ok(())
    } else {
        Err(PatchError::Test {
            path: path.to_string(),
        })
    }
}

/// Apply a single operation to the document in place.
///
/// # Example
///
/// ```
/// use json_render::json_patch::{apply_op, Op};
/// use serde_json::json;
///
/// let mut doc = json!({"list": [1, 2, 3]});
/// apply_op(&mut doc, &Op::Add { path: "/list/1".into(), value: json!(99) }).unwrap();
/// assert_eq!(doc, json!({"list": [1, 99, 2, 3]}));
///
/// let err = apply_op(&mut doc, &Op::Test { path: "/list/0".into(), value: Some(json!(5)) }).unwrap_err();
/// assert!(err.to_string().contains("/list/0"));
/// ```
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Add { path, value } => add_by_pointer(doc, path, value.clone()),
        Op::Remove { path } => {
            remove_by_pointer(doc, path);
        }
        Op::Replace { path, value } => set_by_pointer(doc, path, value.clone()),
        Op::Move { path, from } => {
            if let Some(from) = from {
                apply_move(doc, path, from);
            }
        }
        Op::Copy { path, from } => {
            if let Some(from) = from {
                apply_copy(doc, path, from);
            }
        }
        Op::Test { path, value } => apply_test(doc, path, value.as_ref())?,
    }
    Ok(())
}

/// Apply a sequence of operations in order, stopping at the first failing
/// `test`. Operations before the failure stay applied.
pub fn apply_ops(doc: &mut Value, ops: &[Op]) -> Result<(), PatchError> {
    for op in ops {
        apply_op(doc, op)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(path: &str, value: Value) -> Op {
        Op::Add { path: path.into(), value }
    }

    #[test]
    fn add_to_object() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &add("/b", json!(2))).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn add_inserts_before_index() {
        let mut doc = json!({"arr": [1, 2, 3]});
        apply_op(&mut doc, &add("/arr/1", json!(99))).unwrap();
        assert_eq!(doc, json!({"arr": [1, 99, 2, 3]}));
    }

    #[test]
    fn add_appends_on_dash() {
        let mut doc = json!({"arr": [1, 2]});
        apply_op(&mut doc, &add("/arr/-", json!(3))).unwrap();
        assert_eq!(doc, json!({"arr": [1, 2, 3]}));
    }

    #[test]
    fn remove_splices_arrays() {
        let mut doc = json!({"arr": ["a", "b", "c"]});
        apply_op(&mut doc, &Op::Remove { path: "/arr/1".into() }).unwrap();
        assert_eq!(doc, json!({"arr": ["a", "c"]}));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Remove { path: "/b/c".into() }).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn replace_creates_missing_target() {
        let mut doc = json!({});
        apply_op(
            &mut doc,
            &Op::Replace { path: "/a/b".into(), value: json!(true) },
        )
        .unwrap();
        assert_eq!(doc, json!({"a": {"b": true}}));
    }

    #[test]
    fn move_and_copy() {
        let mut doc = json!({"a": {"x": 1}, "b": {}});
        apply_op(&mut doc, &Op::Copy { path: "/b/y".into(), from: Some("/a/x".into()) }).unwrap();
        assert_eq!(doc, json!({"a": {"x": 1}, "b": {"y": 1}}));
        apply_op(&mut doc, &Op::Move { path: "/b/z".into(), from: Some("/a/x".into()) }).unwrap();
        assert_eq!(doc, json!({"a": {}, "b": {"y": 1, "z": 1}}));
    }

    #[test]
    fn move_without_from_is_noop() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &Op::Move { path: "/b".into(), from: None }).unwrap();
        apply_op(&mut doc, &Op::Copy { path: "/c".into(), from: None }).unwrap();
        apply_op(&mut doc, &Op::Move { path: "/d".into(), from: Some("/nope".into()) }).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_op_uses_structural_equality() {
        let doc = json!({"n": 1.0, "o": {"a": [1, {"b": null}]}});
        let mut doc2 = doc.clone();
        apply_op(&mut doc2, &Op::Test { path: "/n".into(), value: Some(json!(1)) }).unwrap();
        apply_op(&mut doc2, &Op::Test { path: "/o".into(), value: Some(json!({"a": [1, {"b": null}]})) })
            .unwrap();
        let err = apply_op(&mut doc2, &Op::Test { path: "/o/a/0".into(), value: Some(json!("1")) })
            .unwrap_err();
        assert_eq!(err, PatchError::Test { path: "/o/a/0".into() });
        assert_eq!(doc2, doc);
    }

    #[test]
    fn valueless_test_asserts_absence() {
        let mut doc = json!({"a": null});
        apply_op(&mut doc, &Op::Test { path: "/b".into(), value: None }).unwrap();
        let err = apply_op(&mut doc, &Op::Test { path: "/a".into(), value: None }).unwrap_err();
        assert_eq!(err, PatchError::Test { path: "/a".into() });
    }

    #[test]
    fn apply_ops_stops_at_failed_test() {
        let mut doc = json!({});
        let ops = vec![
            add("/a", json!(1)),
            Op::Test { path: "/a".into(), value: Some(json!(2)) },
            add("/b", json!(2)),
        ];
        assert!(apply_ops(&mut doc, &ops).is_err());
        assert_eq!(doc, json!({"a": 1}));
    }
}
