//! JSON Pointer (RFC 6901) utilities.
//!
//! Parsing, escaping and formatting of pointers, plus the lenient read and
//! write primitives the patch engine and the expression evaluator are built
//! on. Every function here is total: paths that do not resolve produce `None`
//! or leave the document untouched, they never error.
//!
//! # Example
//!
//! ```
//! use json_render_json_pointer::{parse_json_pointer, format_json_pointer, get, set};
//! use serde_json::json;
//!
//! let path = parse_json_pointer("/foo/bar");
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/foo/bar");
//!
//! let mut doc = json!({});
//! set(&mut doc, &path, json!(42));
//! assert_eq!(get(&doc, &path), Some(&json!(42)));
//! ```

pub mod get;
pub mod mutate;
pub mod types;
pub mod util;

pub use get::{get, get_by_pointer, get_mut};
pub use mutate::{add, add_by_pointer, remove, remove_by_pointer, set, set_by_pointer};
pub use types::{Path, PathStep};
pub use util::{
    escape_component, format_json_pointer, is_integer, is_root, join_pointer, parse_json_pointer,
    unescape_component,
};
