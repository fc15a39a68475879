//! Core types for the patch engine.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// A `test` operation found a different value (or none) at `path`.
    #[error("Test operation failed at path \"{path}\"")]
    Test { path: String },
    /// The operation could not be decoded.
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

/// One patch operation. Paths are kept as the pointer strings they arrived
/// with so the audit trail and error messages match the wire text.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add {
        path: String,
        value: Value,
    },
    Remove {
        path: String,
    },
    /// Lenient: behaves like a set and creates the target when missing.
    Replace {
        path: String,
        value: Value,
    },
    /// No-op without `from`.
    Move {
        path: String,
        from: Option<String>,
    },
    /// No-op without `from`.
    Copy {
        path: String,
        from: Option<String>,
    },
    /// `value: None` asserts that nothing is at `path`.
    Test {
        path: String,
        value: Option<Value>,
    },
}

impl Op {
    /// The wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Move { path, .. }
            | Op::Copy { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    pub fn from(&self) -> Option<&str> {
        match self {
            Op::Move { from, .. } | Op::Copy { from, .. } => from.as_deref(),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } => Some(value),
            Op::Test { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    /// Returns true for operations that only inspect the document.
    pub fn is_predicate(&self) -> bool {
        matches!(self, Op::Test { .. })
    }
}
