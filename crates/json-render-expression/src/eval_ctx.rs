use std::borrow::Cow;
use std::fmt;

use json_render_json_pointer::get_by_pointer;
use serde_json::Value;

/// Read access to a state model by pointer.
///
/// Implemented for `serde_json::Value`. Stores that keep state in their own
/// shape implement it so expressions can be evaluated against a snapshot
/// without converting it first.
pub trait StateRead: fmt::Debug {
    /// The value at `pointer`, or `None` when it does not resolve.
    fn read(&self, pointer: &str) -> Option<Cow<'_, Value>>;
}

impl StateRead for Value {
    fn read(&self, pointer: &str) -> Option<Cow<'_, Value>> {
        get_by_pointer(self, pointer).map(Cow::Borrowed)
    }
}

/// The iteration an element is being expanded for inside a `repeat`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatScope<'a> {
    /// The current array entry.
    pub item: &'a Value,
    /// Position of `item` in the repeated array.
    pub index: usize,
    /// Absolute pointer of `item` in the state model, e.g. `/todos/3`.
    pub base_path: String,
}

/// Everything an expression can read while it is evaluated.
///
/// Mirrors the renderer's per-element context: the state model snapshot and,
/// inside a repeat, the current item.
#[derive(Debug, Clone)]
pub struct EvalCtx<'a> {
    /// The state model snapshot.
    pub state: &'a dyn StateRead,
    /// The active repeat scope, if any.
    pub repeat: Option<RepeatScope<'a>>,
}

impl<'a> EvalCtx<'a> {
    pub fn new(state: &'a dyn StateRead) -> Self {
        EvalCtx {
            state,
            repeat: None,
        }
    }

    pub fn with_repeat(mut self, item: &'a Value, index: usize, base_path: impl Into<String>) -> Self {
        self.repeat = Some(RepeatScope {
            item,
            index,
            base_path: base_path.into(),
        });
        self
    }
}
