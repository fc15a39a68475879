//! Declarative expressions evaluated against a JSON state model.
//!
//! # Overview
//!
//! Elements of a compiled document carry four kinds of expressions:
//!
//! - `visible` conditions, see [`visibility`]
//! - prop values that read, bind, branch, compute or interpolate, see [`props`]
//! - `on` action bindings, see [`actions`]
//! - validation checks, see [`validation`]
//!
//! Every expression is plain JSON keyed by a discriminator such as `$state`.
//! The bare spelling (`state`) is read too when the object holds nothing but
//! that expression's keys, so a literal object with other fields is never
//! mistaken for one. Resolution is total: anything that does not resolve
//! becomes "undefined" (`None`) rather than an error.
//!
//! # Example
//!
//! ```
//! use json_render_expression::{evaluate_visibility, EvalCtx, Evaluator, VisibilityCondition};
//! use serde_json::json;
//!
//! let state = json!({"todos": [{"title": "Write docs", "done": false}]});
//! let item = &state["todos"][0];
//! let ctx = EvalCtx::new(&state).with_repeat(item, 0, "/todos/0");
//!
//! let hidden_when_done = VisibilityCondition::from(json!({"$item": "done", "not": true}));
//! assert!(evaluate_visibility(Some(&hidden_when_done), &ctx));
//!
//! let props = json!({"label": {"$item": "title"}, "checked": {"$bindItem": "done"}});
//! let props = props.as_object().unwrap();
//! let evaluator = Evaluator::new();
//! assert_eq!(evaluator.resolve_props(props, &ctx)["label"], json!("Write docs"));
//! assert_eq!(evaluator.resolve_bindings(props, &ctx)["checked"], "/todos/0/done");
//! ```

pub mod actions;
pub mod dynamic;
pub mod error;
pub mod eval_ctx;
pub mod evaluator;
pub mod props;
pub mod util;
pub mod validation;
pub mod visibility;

pub use actions::{
    execute_action, resolve_action, resolve_action_bindings, ActionBinding, ActionBindings,
    ActionConfirm, ActionDispatcher, ActionHandler, ActionOutcome, ResolvedAction,
    ERROR_MESSAGE_SENTINEL,
};
pub use dynamic::{resolve_dynamic, resolve_dynamic_map};
pub use error::ActionError;
pub use eval_ctx::{EvalCtx, RepeatScope, StateRead};
pub use evaluator::{ComputedFn, Evaluator, EvaluatorOptions, ValidationFn};
pub use props::PropExpression;
pub use validation::{
    builtin_validation, ValidationCheck, ValidationCheckResult, ValidationConfig,
    ValidationResult, BUILTIN_VALIDATIONS,
};
pub use visibility::{
    evaluate_visibility, Comparison, Operand, SingleCondition, ValueSource, VisibilityCondition,
};
