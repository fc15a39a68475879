//! Field validation.
//!
//! A [`ValidationConfig`] lists checks by type name. Each check resolves its
//! dynamic args against the state model and runs either a caller-registered
//! function or one of the built-ins below.

use std::sync::OnceLock;

use json_render_util::deep_equal_opt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::dynamic::resolve_dynamic_map;
use crate::eval_ctx::EvalCtx;
use crate::evaluator::Evaluator;
use crate::util::{as_numeric, is_truthy};
use crate::visibility::VisibilityCondition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    #[serde(rename = "type")]
    pub check_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub checks: Vec<ValidationCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<VisibilityCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationCheckResult {
    #[serde(rename = "type")]
    pub check_type: String,
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Messages of the failing checks, in declaration order.
    pub errors: Vec<String>,
    pub checks: Vec<ValidationCheckResult>,
}

impl ValidationResult {
    fn passing() -> Self {
        ValidationResult {
            valid: true,
            errors: Vec::new(),
            checks: Vec::new(),
        }
    }
}

/// Signature shared by the built-in validators.
pub type BuiltinValidationFn = fn(Option<&Value>, &Map<String, Value>) -> bool;

pub const BUILTIN_VALIDATIONS: [&str; 14] = [
    "required",
    "email",
    "minLength",
    "maxLength",
    "pattern",
    "min",
    "max",
    "numeric",
    "url",
    "matches",
    "equalTo",
    "lessThan",
    "greaterThan",
    "requiredIf",
];

/// Looks up a built-in validator by type name.
pub fn builtin_validation(name: &str) -> Option<BuiltinValidationFn> {
    let f: BuiltinValidationFn = match name {
        "required" => |value, _| required(value),
        "email" => email,
        "minLength" => |value, args| {
            string_length(value, args.get("min"), |len, bound| len >= bound)
        },
        "maxLength" => |value, args| {
            string_length(value, args.get("max"), |len, bound| len <= bound)
        },
        "pattern" => pattern,
        "min" => |value, args| numeric_bound(value, args.get("min"), |n, bound| n >= bound),
        "max" => |value, args| numeric_bound(value, args.get("max"), |n, bound| n <= bound),
        "numeric" => |value, _| as_numeric(value).is_some(),
        "url" => url,
        "matches" | "equalTo" => |value, args| deep_equal_opt(value, args.get("other")),
        "lessThan" => |value, args| ordered(value, args.get("other"), std::cmp::Ordering::Less),
        "greaterThan" => {
            |value, args| ordered(value, args.get("other"), std::cmp::Ordering::Greater)
        }
        "requiredIf" => |value, args| !is_truthy(args.get("field")) || required(value),
        _ => return None,
    };
    Some(f)
}

fn required(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn email(value: Option<&Value>, _: &Map<String, Value>) -> bool {
    match (value, email_regex()) {
        (Some(Value::String(s)), Some(re)) => re.is_match(s),
        _ => false,
    }
}

fn string_length(value: Option<&Value>, bound: Option<&Value>, cmp: fn(f64, f64) -> bool) -> bool {
    match (value, as_numeric(bound)) {
        (Some(Value::String(s)), Some(bound)) => cmp(s.chars().count() as f64, bound),
        _ => false,
    }
}

fn pattern(value: Option<&Value>, args: &Map<String, Value>) -> bool {
    let (Some(Value::String(s)), Some(Value::String(source))) = (value, args.get("pattern")) else {
        return false;
    };
    match Regex::new(source) {
        Ok(re) => re.is_match(s),
        Err(err) => {
            warn!(pattern = %source, error = %err, "invalid validation pattern");
            false
        }
    }
}

fn numeric_bound(value: Option<&Value>, bound: Option<&Value>, cmp: fn(f64, f64) -> bool) -> bool {
    match (as_numeric(value), as_numeric(bound)) {
        (Some(n), Some(bound)) => cmp(n, bound),
        _ => false,
    }
}

fn url(value: Option<&Value>, _: &Map<String, Value>) -> bool {
    match value {
        Some(Value::String(s)) => url::Url::parse(s).is_ok(),
        _ => false,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Cross-field ordering. Empty on either side passes so an unfilled field
/// does not fail its partner.
fn ordered(value: Option<&Value>, other: Option<&Value>, expected: std::cmp::Ordering) -> bool {
    if is_empty(value) || is_empty(other) {
        return true;
    }
    if let (Some(a), Some(b)) = (as_numeric(value), as_numeric(other)) {
        return a.partial_cmp(&b) == Some(expected);
    }
    match (value, other) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b) == expected,
        _ => false,
    }
}

impl Evaluator {
    /// Runs one check against `value`. Unknown check types pass.
    pub fn run_check(
        &self,
        check: &ValidationCheck,
        value: Option<&Value>,
        ctx: &EvalCtx<'_>,
    ) -> ValidationCheckResult {
        let args = resolve_dynamic_map(&check.args, ctx.state);
        let name = check.check_type.as_str();
        let valid = if let Some(f) = self.custom_validation_fn(name) {
            f(value, &args)
        } else if let Some(f) = builtin_validation(name) {
            f(value, &args)
        } else {
            if self.should_warn(&format!("validation:{name}")) {
                warn!(name, "unknown validation type, treating as valid");
            }
            true
        };
        ValidationCheckResult {
            check_type: check.check_type.clone(),
            valid,
            message: check.message.clone(),
        }
    }

    /// Runs every check of `config` in order.
    ///
    /// When `enabled` is present and false no check runs and the result is a
    /// pass with an empty `checks` list.
    ///
    /// # Example
    ///
    /// ```
    /// use json_render_expression::{EvalCtx, Evaluator, ValidationConfig};
    /// use serde_json::json;
    ///
    /// let config: ValidationConfig = serde_json::from_value(json!({
    ///     "checks": [
    ///         {"type": "required", "message": "Email is required"},
    ///         {"type": "email", "message": "Invalid email"}
    ///     ]
    /// }))
    /// .unwrap();
    /// let state = json!({"form": {"email": "nope"}});
    /// let ctx = EvalCtx::new(&state);
    ///
    /// let result = Evaluator::new().run_validation(&config, state.pointer("/form/email"), &ctx);
    /// assert!(!result.valid);
    /// assert_eq!(result.errors, vec!["Invalid email".to_string()]);
    /// ```
    pub fn run_validation(
        &self,
        config: &ValidationConfig,
        value: Option<&Value>,
        ctx: &EvalCtx<'_>,
    ) -> ValidationResult {
        if let Some(enabled) = &config.enabled {
            if !enabled.evaluate(ctx) {
                return ValidationResult::passing();
            }
        }
        let checks: Vec<ValidationCheckResult> = config
            .checks
            .iter()
            .map(|check| self.run_check(check, value, ctx))
            .collect();
        let errors: Vec<String> = checks
            .iter()
            .filter(|check| !check.valid)
            .map(|check| check.message.clone())
            .collect();
        ValidationResult {
            valid: errors.is_empty(),
            errors,
            checks,
        }
    }
}
