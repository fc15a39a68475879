//! Visibility conditions evaluated against state and repeat scopes.

use json_render_expression::{evaluate_visibility, EvalCtx, VisibilityCondition};
use serde_json::{json, Value};

fn check(condition: Value, expected: bool, state: Value) {
    let ctx = EvalCtx::new(&state);
    let parsed = VisibilityCondition::from(&condition);
    assert_eq!(
        evaluate_visibility(Some(&parsed), &ctx),
        expected,
        "condition: {condition}, state: {state}"
    );
}

fn check_item(condition: Value, expected: bool, item: Value, index: usize) {
    let state = json!({"list": [item.clone()]});
    let ctx = EvalCtx::new(&state).with_repeat(&item, index, "/list/0");
    let parsed = VisibilityCondition::from(&condition);
    assert_eq!(evaluate_visibility(Some(&parsed), &ctx), expected, "condition: {condition}");
}

#[test]
fn absent_condition_is_visible() {
    let state = json!({});
    assert!(evaluate_visibility(None, &EvalCtx::new(&state)));
}

#[test]
fn literals() {
    check(json!(true), true, json!({}));
    check(json!(false), false, json!({}));
}

#[test]
fn greater_than_on_state() {
    check(json!({"$state": "/count", "gt": 3}), true, json!({"count": 5}));
    check(json!({"$state": "/count", "gt": 5}), false, json!({"count": 5}));
    check(json!({"$state": "/count", "gte": 5}), true, json!({"count": 5}));
    check(json!({"$state": "/count", "lt": 5.5}), true, json!({"count": 5}));
    check(json!({"$state": "/count", "lte": 4}), false, json!({"count": 5}));
}

#[test]
fn array_is_implicit_and() {
    check(
        json!([{"$state": "/a"}, {"$state": "/b"}]),
        false,
        json!({"a": true, "b": false}),
    );
    check(json!([{"$state": "/a"}, {"$state": "/b"}]), true, json!({"a": 1, "b": "x"}));
    check(json!([]), true, json!({}));
}

#[test]
fn and_or_combinators() {
    let state = json!({"a": true, "b": false});
    check(json!({"$and": [{"$state": "/a"}, {"$state": "/b"}]}), false, state.clone());
    check(json!({"$or": [{"$state": "/a"}, {"$state": "/b"}]}), true, state.clone());
    check(json!({"$or": []}), false, state.clone());
    check(
        json!({"$or": [false, {"$and": [{"$state": "/a"}, {"$state": "/b", "not": true}]}]}),
        true,
        state,
    );
}

#[test]
fn equality_is_structural() {
    let state = json!({"user": {"role": "admin", "tags": [1, 2]}});
    check(json!({"$state": "/user/role", "eq": "admin"}), true, state.clone());
    check(json!({"$state": "/user/tags", "eq": [1, 2]}), true, state.clone());
    check(json!({"$state": "/user/tags", "neq": [2, 1]}), true, state.clone());
    check(json!({"$state": "/missing", "eq": {"$state": "/also/missing"}}), true, state);
}

#[test]
fn operands_can_reference_state() {
    let state = json!({"value": 7, "min": 5, "max": "10"});
    check(json!({"$state": "/value", "gte": {"$state": "/min"}}), true, state.clone());
    // "10" is a string, so the numeric comparison fails.
    check(json!({"$state": "/value", "lt": {"$state": "/max"}}), false, state);
}

#[test]
fn not_inverts_comparisons() {
    check(json!({"$state": "/n", "eq": 1, "not": true}), false, json!({"n": 1}));
    check(json!({"$state": "/n", "gt": 1, "not": true}), true, json!({"n": null}));
}

#[test]
fn item_and_index_sources() {
    check_item(json!({"$item": "done"}), true, json!({"done": true}), 0);
    check_item(json!({"$item": ""}), true, json!("whole item"), 0);
    check_item(json!({"$item": "meta/priority", "gt": 2}), true, json!({"meta": {"priority": 3}}), 0);
    check_item(json!({"$index": true, "eq": 0}), true, json!({}), 0);
    check_item(json!({"$index": true, "eq": 0}), false, json!({}), 4);
}

#[test]
fn item_sources_outside_repeat_are_missing() {
    check(json!({"$item": "done"}), false, json!({"done": true}));
    check(json!({"$index": true, "gte": 0}), false, json!({}));
    check(json!({"$index": true, "not": true}), true, json!({}));
}

#[test]
fn deserializes_through_serde() {
    let condition: VisibilityCondition =
        serde_json::from_value(json!({"$state": "/flag", "eq": true})).unwrap();
    let state = json!({"flag": true});
    assert!(condition.evaluate(&EvalCtx::new(&state)));
    assert_eq!(
        serde_json::to_value(&condition).unwrap(),
        json!({"$state": "/flag", "eq": true})
    );
}

#[test]
fn bare_key_conditions() {
    check(json!({"state": "/count", "gt": 3}), true, json!({"count": 5}));
    check(
        json!([{"state": "/a"}, {"state": "/b"}]),
        false,
        json!({"a": true, "b": false}),
    );
    let both = json!({"a": true, "b": true});
    check(json!({"and": [{"state": "/a"}, {"state": "/b"}]}), true, both.clone());
    check(json!({"or": [{"state": "/missing"}, {"state": "/b"}]}), true, both.clone());
    check(json!({"or": [{"state": "/missing"}]}), false, both);
}
