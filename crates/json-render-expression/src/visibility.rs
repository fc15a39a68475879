//! Visibility conditions.
//!
//! A condition is one of:
//!
//! - `true` / `false`
//! - a single comparison: `{"$state": "/count", "gt": 3}`, `{"$item": "done"}`,
//!   `{"$index": true, "eq": 0}`, optionally with `"not": true`
//! - an array of conditions (implicit AND)
//! - `{"$and": [...]}` / `{"$or": [...]}`
//!
//! Comparison operands may themselves be source references such as
//! `{"gte": {"$state": "/min"}}`.
//!
//! Every discriminator also has a bare spelling (`{"state": "/count", "gt": 3}`,
//! `{"and": [...]}`), recognised when the object holds nothing but condition
//! keys. Conditions are always written back in the `$` spelling.

use std::borrow::Cow;

use json_render_json_pointer::get_by_pointer;
use json_render_util::deep_equal_opt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::eval_ctx::EvalCtx;
use crate::util::{as_number, expression_key, is_truthy};

/// Keys a single condition may carry, in either spelling.
const CONDITION_KEYS: [&str; 10] = [
    "state", "item", "index", "not", "eq", "neq", "gt", "gte", "lt", "lte",
];

// ----------------------------------------------------------------- Value sources

/// Where a condition (or a comparison operand) reads its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// Absolute pointer into the state model.
    State(String),
    /// Pointer relative to the current repeat item; `""` is the item itself.
    Item(String),
    /// The current repeat index.
    Index,
}

impl ValueSource {
    /// Recognises `{"$state": ptr}`, `{"$item": rel}` and `{"$index": true}`,
    /// and the same with bare keys.
    pub fn from_object(map: &Map<String, Value>) -> Option<Self> {
        if let Some(Value::String(pointer)) = expression_key(map, "$state", &CONDITION_KEYS) {
            return Some(ValueSource::State(pointer.clone()));
        }
        if let Some(Value::String(pointer)) = expression_key(map, "$item", &CONDITION_KEYS) {
            return Some(ValueSource::Item(pointer.clone()));
        }
        if expression_key(map, "$index", &CONDITION_KEYS) == Some(&Value::Bool(true)) {
            return Some(ValueSource::Index);
        }
        None
    }

    /// Reads the value. Item and index sources are missing outside a repeat.
    pub fn resolve<'a>(&self, ctx: &EvalCtx<'a>) -> Option<Cow<'a, Value>> {
        match self {
            ValueSource::State(pointer) => ctx.state.read(pointer),
            ValueSource::Item(pointer) => {
                let scope = ctx.repeat.as_ref()?;
                get_by_pointer(scope.item, pointer).map(Cow::Borrowed)
            }
            ValueSource::Index => {
                let scope = ctx.repeat.as_ref()?;
                Some(Cow::Owned(json!(scope.index)))
            }
        }
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        match self {
            ValueSource::State(pointer) => map.insert("$state".into(), json!(pointer)),
            ValueSource::Item(pointer) => map.insert("$item".into(), json!(pointer)),
            ValueSource::Index => map.insert("$index".into(), json!(true)),
        };
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Source(ValueSource),
}

impl Operand {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => match ValueSource::from_object(map) {
                Some(source) => Operand::Source(source),
                None => Operand::Literal(value.clone()),
            },
            other => Operand::Literal(other.clone()),
        }
    }

    pub fn resolve<'a>(&'a self, ctx: &EvalCtx<'a>) -> Option<Cow<'a, Value>> {
        match self {
            Operand::Literal(value) => Some(Cow::Borrowed(value)),
            Operand::Source(source) => source.resolve(ctx),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Operand::Literal(value) => value.clone(),
            Operand::Source(source) => {
                let mut map = Map::new();
                source.write_into(&mut map);
                Value::Object(map)
            }
        }
    }
}

// ------------------------------------------------------------------ Comparisons

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Eq(Operand),
    Neq(Operand),
    Gt(Operand),
    Gte(Operand),
    Lt(Operand),
    Lte(Operand),
}

impl Comparison {
    /// Operator keys in the order they are looked up; only the first one
    /// present on a condition is applied.
    pub const KEYS: [&'static str; 6] = ["eq", "neq", "gt", "gte", "lt", "lte"];

    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        Self::KEYS.iter().find_map(|key| {
            let operand = Operand::from_value(map.get(*key)?);
            Some(match *key {
                "eq" => Comparison::Eq(operand),
                "neq" => Comparison::Neq(operand),
                "gt" => Comparison::Gt(operand),
                "gte" => Comparison::Gte(operand),
                "lt" => Comparison::Lt(operand),
                _ => Comparison::Lte(operand),
            })
        })
    }

    fn key_and_operand(&self) -> (&'static str, &Operand) {
        match self {
            Comparison::Eq(op) => ("eq", op),
            Comparison::Neq(op) => ("neq", op),
            Comparison::Gt(op) => ("gt", op),
            Comparison::Gte(op) => ("gte", op),
            Comparison::Lt(op) => ("lt", op),
            Comparison::Lte(op) => ("lte", op),
        }
    }

    fn apply(&self, left: Option<&Value>, ctx: &EvalCtx<'_>) -> bool {
        let (_, operand) = self.key_and_operand();
        let right = operand.resolve(ctx);
        let right = right.as_deref();
        match self {
            Comparison::Eq(_) => deep_equal_opt(left, right),
            Comparison::Neq(_) => !deep_equal_opt(left, right),
            Comparison::Gt(_) => numeric(left, right, |a, b| a > b),
            Comparison::Gte(_) => numeric(left, right, |a, b| a >= b),
            Comparison::Lt(_) => numeric(left, right, |a, b| a < b),
            Comparison::Lte(_) => numeric(left, right, |a, b| a <= b),
        }
    }
}

/// Numeric comparisons are false unless both sides are JSON numbers.
fn numeric(left: Option<&Value>, right: Option<&Value>, cmp: fn(f64, f64) -> bool) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

// ------------------------------------------------------------------- Conditions

#[derive(Debug, Clone, PartialEq)]
pub struct SingleCondition {
    pub source: ValueSource,
    pub comparison: Option<Comparison>,
    pub not: bool,
}

impl SingleCondition {
    pub fn evaluate(&self, ctx: &EvalCtx<'_>) -> bool {
        let left = self.source.resolve(ctx);
        let left = left.as_deref();
        let result = match &self.comparison {
            Some(comparison) => comparison.apply(left, ctx),
            None => is_truthy(left),
        };
        result != self.not
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum VisibilityCondition {
    Literal(bool),
    Single(SingleCondition),
    /// A bare array: every entry must hold.
    All(Vec<VisibilityCondition>),
    And(Vec<VisibilityCondition>),
    Or(Vec<VisibilityCondition>),
    /// Anything else. Never visible.
    Unrecognized(Value),
}

impl VisibilityCondition {
    /// Shorthand for `{"$state": pointer}`.
    pub fn state(pointer: impl Into<String>) -> Self {
        VisibilityCondition::Single(SingleCondition {
            source: ValueSource::State(pointer.into()),
            comparison: None,
            not: false,
        })
    }

    pub fn evaluate(&self, ctx: &EvalCtx<'_>) -> bool {
        match self {
            VisibilityCondition::Literal(b) => *b,
            VisibilityCondition::Single(single) => single.evaluate(ctx),
            VisibilityCondition::All(items) | VisibilityCondition::And(items) => {
                items.iter().all(|c| c.evaluate(ctx))
            }
            VisibilityCondition::Or(items) => items.iter().any(|c| c.evaluate(ctx)),
            VisibilityCondition::Unrecognized(_) => false,
        }
    }
}

/// Evaluates an optional condition; an absent condition is visible.
///
/// # Example
///
/// ```
/// use json_render_expression::{evaluate_visibility, EvalCtx, VisibilityCondition};
/// use serde_json::json;
///
/// let state = json!({"count": 5});
/// let ctx = EvalCtx::new(&state);
/// let cond = VisibilityCondition::from(json!({"$state": "/count", "gt": 3}));
/// assert!(evaluate_visibility(Some(&cond), &ctx));
/// assert!(evaluate_visibility(None, &ctx));
/// ```
pub fn evaluate_visibility(condition: Option<&VisibilityCondition>, ctx: &EvalCtx<'_>) -> bool {
    condition.map_or(true, |c| c.evaluate(ctx))
}

fn parse_list(items: &[Value]) -> Vec<VisibilityCondition> {
    items.iter().map(VisibilityCondition::from).collect()
}

impl From<&Value> for VisibilityCondition {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => VisibilityCondition::Literal(*b),
            Value::Array(items) => VisibilityCondition::All(parse_list(items)),
            Value::Object(map) => {
                if let Some(Value::Array(items)) = expression_key(map, "$and", &["and"]) {
                    return VisibilityCondition::And(parse_list(items));
                }
                if let Some(Value::Array(items)) = expression_key(map, "$or", &["or"]) {
                    return VisibilityCondition::Or(parse_list(items));
                }
                match ValueSource::from_object(map) {
                    Some(source) => VisibilityCondition::Single(SingleCondition {
                        source,
                        comparison: Comparison::from_object(map),
                        not: map.get("not") == Some(&Value::Bool(true)),
                    }),
                    None => VisibilityCondition::Unrecognized(value.clone()),
                }
            }
            other => VisibilityCondition::Unrecognized(other.clone()),
        }
    }
}

impl From<Value> for VisibilityCondition {
    fn from(value: Value) -> Self {
        VisibilityCondition::from(&value)
    }
}

impl From<VisibilityCondition> for Value {
    fn from(condition: VisibilityCondition) -> Self {
        match condition {
            VisibilityCondition::Literal(b) => Value::Bool(b),
            VisibilityCondition::All(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            VisibilityCondition::And(items) => {
                json!({ "$and": items.into_iter().map(Value::from).collect::<Vec<_>>() })
            }
            VisibilityCondition::Or(items) => {
                json!({ "$or": items.into_iter().map(Value::from).collect::<Vec<_>>() })
            }
            VisibilityCondition::Single(single) => {
                let mut map = Map::new();
                single.source.write_into(&mut map);
                if let Some(comparison) = &single.comparison {
                    let (key, operand) = comparison.key_and_operand();
                    map.insert(key.into(), operand.to_value());
                }
                if single.not {
                    map.insert("not".into(), Value::Bool(true));
                }
                Value::Object(map)
            }
            VisibilityCondition::Unrecognized(value) => value,
        }
    }
}
