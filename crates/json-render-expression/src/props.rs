//! Prop expressions and their resolution.
//!
//! Discriminators are written `$state`, `$cond`, ... The bare spellings
//! (`{"state": "/ptr"}`, `{"cond": ..., "then": ..., "else": ...}`) are read
//! too, but only from objects that hold nothing else, so plain object props
//! keep their fields.

use std::borrow::Cow;
use std::collections::BTreeMap;

use json_render_json_pointer::{get_by_pointer, join_pointer};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::eval_ctx::EvalCtx;
use crate::evaluator::Evaluator;
use crate::util::{bare_key, expression_key, interpolate};
use crate::visibility::VisibilityCondition;

/// One node of a prop value, classified by its discriminator key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropExpression<'a> {
    /// `{"$state": "/ptr"}`
    State(&'a str),
    /// `{"$item": "field"}`
    Item(&'a str),
    /// `{"$index": true}`
    Index,
    /// `{"$bindState": "/ptr"}`: reads like `State`, writes back to the pointer.
    BindState(&'a str),
    /// `{"$bindItem": "field"}`: reads like `Item`, writes back under the
    /// repeat scope's base path.
    BindItem(&'a str),
    /// `{"$cond": <condition>, "$then": <expr>, "$else": <expr>}`
    Cond {
        condition: &'a Value,
        then: Option<&'a Value>,
        otherwise: Option<&'a Value>,
    },
    /// `{"$computed": "name", "args": {...}}`
    Computed { name: &'a str, args: Option<&'a Value> },
    /// `{"$template": "Hello ${/user/name}"}`
    Template(&'a str),
    /// A plain array; entries are resolved recursively.
    Array(&'a [Value]),
    /// A plain object; members are resolved recursively.
    Object(&'a Map<String, Value>),
    Literal(&'a Value),
}

impl<'a> PropExpression<'a> {
    pub fn classify(value: &'a Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            Value::Array(items) => return PropExpression::Array(items),
            other => return PropExpression::Literal(other),
        };
        let str_key =
            |key: &str, allowed: &[&str]| expression_key(map, key, allowed).and_then(Value::as_str);
        if let Some(pointer) = str_key("$state", &["state"]) {
            return PropExpression::State(pointer);
        }
        if let Some(pointer) = str_key("$item", &["item"]) {
            return PropExpression::Item(pointer);
        }
        if expression_key(map, "$index", &["index"]) == Some(&Value::Bool(true)) {
            return PropExpression::Index;
        }
        if let Some(pointer) = str_key("$bindState", &["bindState"]) {
            return PropExpression::BindState(pointer);
        }
        if let Some(pointer) = str_key("$bindItem", &["bindItem"]) {
            return PropExpression::BindItem(pointer);
        }
        if let Some(condition) = map.get("$cond") {
            return PropExpression::Cond {
                condition,
                then: map.get("$then"),
                otherwise: map.get("$else"),
            };
        }
        if let Some(condition) = bare_key(map, "cond", &["cond", "then", "else"]) {
            return PropExpression::Cond {
                condition,
                then: map.get("then"),
                otherwise: map.get("else"),
            };
        }
        if let Some(name) = str_key("$computed", &["computed", "args"]) {
            return PropExpression::Computed {
                name,
                args: map.get("args"),
            };
        }
        if let Some(text) = str_key("$template", &["template"]) {
            return PropExpression::Template(text);
        }
        PropExpression::Object(map)
    }
}

impl Evaluator {
    /// Resolves a prop value against the context. `None` is "undefined".
    ///
    /// # Example
    ///
    /// ```
    /// use json_render_expression::{EvalCtx, Evaluator};
    /// use serde_json::json;
    ///
    /// let state = json!({"user": {"name": "Ada"}, "admin": true});
    /// let ctx = EvalCtx::new(&state);
    /// let evaluator = Evaluator::new();
    ///
    /// let value = json!({
    ///     "title": {"$template": "Hi ${/user/name}"},
    ///     "badge": {"$cond": {"$state": "/admin"}, "$then": "admin", "$else": "user"}
    /// });
    /// assert_eq!(
    ///     evaluator.resolve_prop(&value, &ctx),
    ///     Some(json!({"title": "Hi Ada", "badge": "admin"}))
    /// );
    /// ```
    pub fn resolve_prop(&self, value: &Value, ctx: &EvalCtx<'_>) -> Option<Value> {
        match PropExpression::classify(value) {
            PropExpression::State(pointer) | PropExpression::BindState(pointer) => {
                ctx.state.read(pointer).map(Cow::into_owned)
            }
            PropExpression::Item(pointer) => {
                let scope = ctx.repeat.as_ref()?;
                get_by_pointer(scope.item, pointer).cloned()
            }
            PropExpression::Index => ctx.repeat.as_ref().map(|scope| json!(scope.index)),
            PropExpression::BindItem(pointer) => match &ctx.repeat {
                Some(scope) => get_by_pointer(scope.item, pointer).cloned(),
                None => {
                    self.warn_bind_item_outside_repeat(pointer);
                    None
                }
            },
            PropExpression::Cond {
                condition,
                then,
                otherwise,
            } => {
                let branch = if VisibilityCondition::from(condition).evaluate(ctx) {
                    then
                } else {
                    otherwise
                };
                self.resolve_prop(branch?, ctx)
            }
            PropExpression::Computed { name, args } => {
                let args = match args {
                    Some(Value::Object(args)) => self.resolve_props(args, ctx),
                    _ => Map::new(),
                };
                match self.computed_fn(name) {
                    Some(f) => Some(f(&args)),
                    None => {
                        if self.should_warn(&format!("computed:{name}")) {
                            warn!(name, "unknown $computed function, resolving to undefined");
                        }
                        None
                    }
                }
            }
            PropExpression::Template(text) => Some(Value::String(interpolate(text, ctx.state))),
            PropExpression::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_prop(item, ctx).unwrap_or(Value::Null))
                    .collect(),
            )),
            PropExpression::Object(map) => Some(Value::Object(self.resolve_props(map, ctx))),
            PropExpression::Literal(value) => Some(value.clone()),
        }
    }

    /// Resolves every prop of an element. Props that resolve to undefined are
    /// left out of the result.
    pub fn resolve_props(&self, props: &Map<String, Value>, ctx: &EvalCtx<'_>) -> Map<String, Value> {
        props
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), self.resolve_prop(value, ctx)?)))
            .collect()
    }

    /// Maps each two-way bound prop to the absolute pointer its edits should
    /// be written back to.
    ///
    /// Only top-level props are inspected. `$bindItem` outside a repeat scope
    /// has nowhere to write and is omitted.
    pub fn resolve_bindings(
        &self,
        props: &Map<String, Value>,
        ctx: &EvalCtx<'_>,
    ) -> BTreeMap<String, String> {
        let mut bindings = BTreeMap::new();
        for (key, value) in props {
            match PropExpression::classify(value) {
                PropExpression::BindState(pointer) => {
                    bindings.insert(key.clone(), pointer.to_string());
                }
                PropExpression::BindItem(pointer) => match &ctx.repeat {
                    Some(scope) => {
                        bindings.insert(key.clone(), join_pointer(&scope.base_path, pointer));
                    }
                    None => self.warn_bind_item_outside_repeat(pointer),
                },
                _ => {}
            }
        }
        bindings
    }

    fn warn_bind_item_outside_repeat(&self, pointer: &str) {
        if self.should_warn(&format!("bindItem:{pointer}")) {
            warn!(pointer, "$bindItem used outside a repeat scope, binding ignored");
        }
    }
}
