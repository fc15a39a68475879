//! Persistent JSON tree behind the state store.
//!
//! Arrays and objects sit behind `Arc`s. A write clones only the containers
//! on its path; every other branch stays shared with snapshots taken before
//! the write.

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexMap;
use json_render_expression::StateRead;
use json_render_json_pointer::{is_integer, parse_json_pointer};
use json_render_util::deep_equal;
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum StateNode {
    /// `null`, a boolean, a number or a string.
    Scalar(Value),
    Array(Arc<Vec<StateNode>>),
    Object(Arc<IndexMap<String, StateNode>>),
}

impl Default for StateNode {
    fn default() -> Self {
        StateNode::Object(Arc::new(IndexMap::new()))
    }
}

fn parse_index(step: &str) -> Option<usize> {
    if is_integer(step) {
        step.parse().ok()
    } else {
        None
    }
}

fn container_for(next_step: &str) -> StateNode {
    if next_step == "-" || parse_index(next_step).is_some() {
        StateNode::Array(Arc::new(Vec::new()))
    } else {
        StateNode::default()
    }
}

impl StateNode {
    pub fn to_value(&self) -> Value {
        match self {
            StateNode::Scalar(value) => value.clone(),
            StateNode::Array(items) => Value::Array(items.iter().map(StateNode::to_value).collect()),
            StateNode::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, node)| (key.clone(), node.to_value()))
                    .collect(),
            ),
        }
    }

    /// Whether both nodes are the same shared container.
    pub fn ptr_eq(&self, other: &StateNode) -> bool {
        match (self, other) {
            (StateNode::Array(a), StateNode::Array(b)) => Arc::ptr_eq(a, b),
            (StateNode::Object(a), StateNode::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn get(&self, path: &[String]) -> Option<&StateNode> {
        let mut current = self;
        for step in path {
            current = match current {
                StateNode::Object(map) => map.get(step)?,
                StateNode::Array(items) => items.get(parse_index(step)?)?,
                StateNode::Scalar(_) => return None,
            };
        }
        Some(current)
    }

    pub fn get_by_pointer(&self, pointer: &str) -> Option<&StateNode> {
        self.get(&parse_json_pointer(pointer))
    }

    /// Writes `value` at `path` with the rules of
    /// [`json_render_json_pointer::set`]: missing and scalar intermediates
    /// become containers, `-` and indices past the end append, and a step
    /// that cannot apply stops the write.
    pub fn set(&mut self, path: &[String], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            *self = StateNode::from(value);
            return;
        };
        let mut current = self;
        for (i, step) in parents.iter().enumerate() {
            let Some(child) = current.slot(step) else {
                return;
            };
            if let StateNode::Scalar(_) = child {
                *child = container_for(&path[i + 1]);
            }
            current = child;
        }
        if let Some(target) = current.slot(last) {
            *target = StateNode::from(value);
        }
    }

    /// The child at `step`, created as `null` when missing. Copies this
    /// container first if a snapshot still shares it.
    fn slot(&mut self, step: &str) -> Option<&mut StateNode> {
        match self {
            StateNode::Object(map) => Some(
                Arc::make_mut(map)
                    .entry(step.to_string())
                    .or_insert(StateNode::Scalar(Value::Null)),
            ),
            StateNode::Array(items) => {
                let index = match step {
                    "-" => None,
                    _ => Some(parse_index(step)?),
                };
                let items = Arc::make_mut(items);
                match index {
                    Some(index) if index < items.len() => items.get_mut(index),
                    _ => {
                        items.push(StateNode::Scalar(Value::Null));
                        items.last_mut()
                    }
                }
            }
            StateNode::Scalar(_) => None,
        }
    }
}

impl From<Value> for StateNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                StateNode::Array(Arc::new(items.into_iter().map(StateNode::from).collect()))
            }
            Value::Object(map) => StateNode::Object(Arc::new(
                map.into_iter()
                    .map(|(key, value)| (key, StateNode::from(value)))
                    .collect(),
            )),
            scalar => StateNode::Scalar(scalar),
        }
    }
}

impl From<&StateNode> for Value {
    fn from(node: &StateNode) -> Self {
        node.to_value()
    }
}

/// Structural equality. Shared containers compare equal without being
/// walked, and numbers compare by value.
impl PartialEq for StateNode {
    fn eq(&self, other: &StateNode) -> bool {
        match (self, other) {
            (StateNode::Scalar(a), StateNode::Scalar(b)) => deep_equal(a, b),
            (StateNode::Array(a), StateNode::Array(b)) => {
                Arc::ptr_eq(a, b) || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y))
            }
            (StateNode::Object(a), StateNode::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| x == y)))
            }
            _ => false,
        }
    }
}

impl PartialEq<Value> for StateNode {
    fn eq(&self, other: &Value) -> bool {
        deep_equal(&self.to_value(), other)
    }
}

impl StateRead for StateNode {
    fn read(&self, pointer: &str) -> Option<Cow<'_, Value>> {
        match self.get_by_pointer(pointer)? {
            StateNode::Scalar(value) => Some(Cow::Borrowed(value)),
            node => Some(Cow::Owned(node.to_value())),
        }
    }
}

impl Serialize for StateNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StateNode::Scalar(value) => value.serialize(serializer),
            StateNode::Array(items) => serializer.collect_seq(items.iter()),
            StateNode::Object(map) => serializer.collect_map(map.iter()),
        }
    }
}
