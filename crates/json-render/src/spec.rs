//! Typed view of a compiled document.
//!
//! The compiler works on a plain `serde_json::Value`; these types are for
//! consumers that want to walk the element tree, and for tooling that reports
//! structural mistakes in generated documents.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use json_render_expression::{ActionBindings, ValidationConfig, VisibilityCondition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatConfig {
    /// State pointer of the array to repeat over.
    pub path: String,
    /// Item field used as a stable key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UIElement {
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<VisibilityCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<IndexMap<String, ActionBindings>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    /// Key of the root element. Empty until the stream sets it.
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub elements: IndexMap<String, UIElement>,
    /// Initial state model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Map<String, Value>>,
}

impl Spec {
    /// Reads a compiled document. `None` while some element does not have
    /// the element shape yet (for example props that arrived before `type`).
    pub fn from_value(value: &Value) -> Option<Self> {
        Spec::deserialize(value).ok()
    }

    pub fn root_element(&self) -> Option<&UIElement> {
        self.elements.get(&self.root)
    }
}

/// A structural problem found by [`validate_spec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecIssue {
    MissingRoot,
    UnknownRoot { root: String },
    MissingChild { parent: String, child: String },
    Unreachable { key: String },
    /// A field that belongs on the element was put inside `props`.
    MisplacedField { key: String, field: &'static str },
}

impl fmt::Display for SpecIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecIssue::MissingRoot => write!(f, "spec has no root"),
            SpecIssue::UnknownRoot { root } => write!(f, "root \"{root}\" is not an element"),
            SpecIssue::MissingChild { parent, child } => {
                write!(f, "element \"{parent}\" references missing child \"{child}\"")
            }
            SpecIssue::Unreachable { key } => {
                write!(f, "element \"{key}\" is not reachable from the root")
            }
            SpecIssue::MisplacedField { key, field } => write!(
                f,
                "element \"{key}\" has \"{field}\" inside props; it belongs on the element"
            ),
        }
    }
}

const ELEMENT_FIELDS: [&str; 3] = ["visible", "on", "repeat"];

/// Reports structural problems. Never fails and never changes `spec`.
pub fn validate_spec(spec: &Spec) -> Vec<SpecIssue> {
    let mut issues = Vec::new();
    if spec.root.is_empty() {
        issues.push(SpecIssue::MissingRoot);
    } else if !spec.elements.contains_key(&spec.root) {
        issues.push(SpecIssue::UnknownRoot {
            root: spec.root.clone(),
        });
    }

    for (key, element) in &spec.elements {
        for child in &element.children {
            if !spec.elements.contains_key(child) {
                issues.push(SpecIssue::MissingChild {
                    parent: key.clone(),
                    child: child.clone(),
                });
            }
        }
        for field in ELEMENT_FIELDS {
            if element.props.contains_key(field) {
                issues.push(SpecIssue::MisplacedField {
                    key: key.clone(),
                    field,
                });
            }
        }
    }

    if spec.elements.contains_key(&spec.root) {
        let reachable = reachable_from(spec, &spec.root);
        for key in spec.elements.keys() {
            if !reachable.contains(key.as_str()) {
                issues.push(SpecIssue::Unreachable { key: key.clone() });
            }
        }
    }
    issues
}

fn reachable_from<'a>(spec: &'a Spec, root: &'a str) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(key) = stack.pop() {
        if !seen.insert(key) {
            continue;
        }
        if let Some(element) = spec.elements.get(key) {
            stack.extend(element.children.iter().map(String::as_str));
        }
    }
    seen
}
