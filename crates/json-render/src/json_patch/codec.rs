//! JSON codec for patch operations.
//!
//! Converts operations to and from `serde_json::Value` in the
//! `{"op", "path", "value"?, "from"?}` wire form.

use serde_json::{json, Map, Value};

use super::types::{Op, PatchError};

fn decode_pointer(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, PatchError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PatchError::InvalidOp(format!("'{key}' must be a string"))),
    }
}

/// A missing `value` on `add` or `replace` writes `null`.
fn decode_value(obj: &Map<String, Value>) -> Value {
    obj.get("value").cloned().unwrap_or(Value::Null)
}

/// Decode one operation.
///
/// `move` and `copy` without `from` decode fine and apply as no-ops. `test`
/// without `value` asserts that the path is missing.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;
    let path = decode_pointer(obj, "path")?
        .ok_or_else(|| PatchError::InvalidOp("missing 'path' field".into()))?;

    match op_str {
        "add" => Ok(Op::Add {
            value: decode_value(obj),
            path,
        }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace {
            value: decode_value(obj),
            path,
        }),
        "move" => Ok(Op::Move {
            from: decode_pointer(obj, "from")?,
            path,
        }),
        "copy" => Ok(Op::Copy {
            from: decode_pointer(obj, "from")?,
            path,
        }),
        "test" => Ok(Op::Test {
            value: obj.get("value").cloned(),
            path,
        }),
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Decode a whole patch (a JSON array of operations).
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

/// Serialize an `Op` back to its wire form.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({"op": "add", "path": path, "value": value}),
        Op::Remove { path } => json!({"op": "remove", "path": path}),
        Op::Replace { path, value } => json!({"op": "replace", "path": path, "value": value}),
        Op::Test {
            path,
            value: Some(value),
        } => json!({"op": "test", "path": path, "value": value}),
        Op::Test { path, value: None } => json!({"op": "test", "path": path}),
        Op::Move { path, from } | Op::Copy { path, from } => {
            let mut m = Map::new();
            m.insert("op".into(), json!(op.op_name()));
            m.insert("path".into(), json!(path));
            if let Some(from) = from {
                m.insert("from".into(), json!(from));
            }
            Value::Object(m)
        }
    }
}

pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}
