use json_render_json_pointer::{
    add_by_pointer, format_json_pointer, get, get_by_pointer, parse_json_pointer,
    remove_by_pointer, set_by_pointer,
};
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn pointer_parse_format_roundtrip_matrix() {
    let cases = ["", "/foo", "/foo/bar", "/a~0b/c~1d", "/arr/0", "/~0/~1"];

    for pointer in cases {
        let path = parse_json_pointer(pointer);
        let out = format_json_pointer(&path);
        assert_eq!(out, pointer);
    }
}

#[test]
fn pointer_get_matrix() {
    let doc = json!({"foo": {"bar": [10, 20, null]}});

    assert_eq!(get_by_pointer(&doc, "/foo/bar/0"), Some(&json!(10)));
    assert_eq!(get_by_pointer(&doc, "/foo/bar/3"), None);
    assert_eq!(get_by_pointer(&doc, "/foo/bar/2"), Some(&json!(null)));
    assert_eq!(get_by_pointer(&doc, "/foo/bar/2/x"), None);
    assert_eq!(get_by_pointer(&doc, "foo/bar/1"), Some(&json!(20)));
    assert_eq!(get_by_pointer(&doc, "/"), Some(&doc));
}

#[test]
fn pointer_mutation_matrix() {
    let mut doc = json!({"arr": [1, 2, 3]});
    add_by_pointer(&mut doc, "/arr/1", json!(99));
    assert_eq!(doc["arr"], json!([1, 99, 2, 3]));

    let mut doc = json!({"arr": [1, 2]});
    add_by_pointer(&mut doc, "/arr/-", json!(3));
    assert_eq!(doc["arr"], json!([1, 2, 3]));

    let mut doc = json!({"arr": ["a", "b", "c"]});
    remove_by_pointer(&mut doc, "/arr/1");
    assert_eq!(doc["arr"], json!(["a", "c"]));

    let mut doc = json!(null);
    set_by_pointer(&mut doc, "/elements/a~1b/props/title", json!("Hi"));
    assert_eq!(doc, json!({"elements": {"a/b": {"props": {"title": "Hi"}}}}));
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ]
}

proptest! {
    // Adds at distinct object pointers read back exactly what was last added.
    #[test]
    fn add_then_get_returns_last_value(
        entries in prop::collection::vec(("[a-d]{1,2}", "[a-d]{1,2}", arb_leaf()), 1..24)
    ) {
        let mut doc = json!({});
        let mut expected = std::collections::BTreeMap::new();
        for (outer, inner, value) in &entries {
            let pointer = format!("/{outer}/{inner}");
            add_by_pointer(&mut doc, &pointer, value.clone());
            expected.insert(pointer, value.clone());
        }
        for (pointer, value) in &expected {
            prop_assert_eq!(get(&doc, &parse_json_pointer(pointer)), Some(value));
        }
    }
}
