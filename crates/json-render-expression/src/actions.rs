//! Action bindings: what an element does when one of its events fires.
//!
//! A binding names an action, carries dynamic params and optionally a
//! confirmation dialog plus `onSuccess`/`onError` follow-ups:
//!
//! ```json
//! {
//!   "action": "deleteTodo",
//!   "params": {"id": {"$state": "/selected/id"}},
//!   "confirm": {"title": "Delete ${/selected/title}?", "message": "This cannot be undone."},
//!   "onSuccess": {"set": {"/selected": null}},
//!   "onError": {"set": {"/error": "$error.message"}}
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::dynamic::resolve_dynamic_map;
use crate::eval_ctx::StateRead;
use crate::error::ActionError;
use crate::util::interpolate;

/// Placeholder inside an `onError` set payload that expands to the message of
/// the error the handler returned.
pub const ERROR_MESSAGE_SENTINEL: &str = "$error.message";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfirm {
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_label: Option<String>,
    /// Presentation hint for the renderer, e.g. `"danger"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// What to do after the handler returns. Exactly one form applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Navigate { navigate: String },
    /// Pointer to value. Values are literal; only the error sentinel expands.
    Set { set: Map<String, Value> },
    Action { action: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBinding {
    pub action: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm: Option<ActionConfirm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<ActionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<ActionOutcome>,
}

impl ActionBinding {
    pub fn new(action: impl Into<String>) -> Self {
        ActionBinding {
            action: action.into(),
            params: Map::new(),
            confirm: None,
            on_success: None,
            on_error: None,
        }
    }
}

/// The value of one entry of an element's `on` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionBindings {
    One(ActionBinding),
    Many(Vec<ActionBinding>),
}

impl ActionBindings {
    pub fn as_slice(&self) -> &[ActionBinding] {
        match self {
            ActionBindings::One(binding) => std::slice::from_ref(binding),
            ActionBindings::Many(bindings) => bindings,
        }
    }
}

/// An [`ActionBinding`] whose params are literals and whose confirm text has
/// been interpolated. Follow-ups are kept as declared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAction {
    pub action: String,
    pub params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<ActionConfirm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_success: Option<ActionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_error: Option<ActionOutcome>,
}

pub fn resolve_action(binding: &ActionBinding, state: &dyn StateRead) -> ResolvedAction {
    ResolvedAction {
        action: binding.action.clone(),
        params: resolve_dynamic_map(&binding.params, state),
        confirm: binding.confirm.as_ref().map(|confirm| ActionConfirm {
            title: interpolate(&confirm.title, state),
            message: interpolate(&confirm.message, state),
            ..confirm.clone()
        }),
        on_success: binding.on_success.clone(),
        on_error: binding.on_error.clone(),
    }
}

/// Resolves every binding of an `on` entry, in declaration order.
pub fn resolve_action_bindings(
    bindings: &ActionBindings,
    state: &dyn StateRead,
) -> Vec<ResolvedAction> {
    bindings
        .as_slice()
        .iter()
        .map(|binding| resolve_action(binding, state))
        .collect()
}

/// Performs the work behind an action name.
pub trait ActionHandler {
    fn call(&mut self, params: &Map<String, Value>) -> Result<(), ActionError>;
}

impl<F> ActionHandler for F
where
    F: FnMut(&Map<String, Value>) -> Result<(), ActionError>,
{
    fn call(&mut self, params: &Map<String, Value>) -> Result<(), ActionError> {
        self(params)
    }
}

/// Where follow-ups land. Hosts that cannot navigate or chain actions keep the
/// default no-ops.
pub trait ActionDispatcher {
    fn set_state(&mut self, pointer: &str, value: Value);

    fn navigate(&mut self, _target: &str) {}

    fn execute(&mut self, _action: &str) -> Result<(), ActionError> {
        Ok(())
    }
}

/// Runs the handler, then dispatches `onSuccess`, or `onError` when the
/// handler fails. Without an `onError` the handler's error is returned.
pub fn execute_action<H, D>(
    action: &ResolvedAction,
    handler: &mut H,
    dispatcher: &mut D,
) -> Result<(), ActionError>
where
    H: ActionHandler + ?Sized,
    D: ActionDispatcher + ?Sized,
{
    match handler.call(&action.params) {
        Ok(()) => match &action.on_success {
            Some(outcome) => dispatch_outcome(outcome, None, dispatcher),
            None => Ok(()),
        },
        Err(err) => match &action.on_error {
            Some(outcome) => {
                debug!(action = %action.action, error = %err, "handler failed, dispatching onError");
                dispatch_outcome(outcome, Some(err.message()), dispatcher)
            }
            None => Err(err),
        },
    }
}

fn dispatch_outcome<D>(
    outcome: &ActionOutcome,
    error_message: Option<&str>,
    dispatcher: &mut D,
) -> Result<(), ActionError>
where
    D: ActionDispatcher + ?Sized,
{
    match outcome {
        ActionOutcome::Navigate { navigate } => {
            debug!(to = %navigate, "navigate");
            dispatcher.navigate(navigate);
            Ok(())
        }
        ActionOutcome::Set { set } => {
            for (pointer, value) in set {
                let value = match error_message {
                    Some(message) => substitute_error(value, message),
                    None => value.clone(),
                };
                dispatcher.set_state(pointer, value);
            }
            Ok(())
        }
        ActionOutcome::Action { action } => {
            debug!(action = %action, "follow-up action");
            dispatcher
                .execute(action)
                .map_err(|source| ActionError::FollowUp {
                    action: action.clone(),
                    source: Box::new(source),
                })
        }
    }
}

fn substitute_error(value: &Value, message: &str) -> Value {
    match value {
        Value::String(s) if s == ERROR_MESSAGE_SENTINEL => Value::String(message.to_string()),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_error(item, message))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), substitute_error(item, message)))
                .collect(),
        ),
        other => other.clone(),
    }
}
