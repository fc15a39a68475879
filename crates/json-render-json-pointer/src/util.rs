use crate::types::Path;

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and then `~0` with `~`, so `~01`
/// decodes to `~1` rather than `/`.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // Order matters: ~ must be escaped before /
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into path components.
///
/// A single leading `/` is optional, so `"a/b"` and `"/a/b"` address the same
/// location. Both `""` and `"/"` denote the root and parse to an empty path.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/"), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/foo/bar"), vec!["foo", "bar"]);
/// assert_eq!(parse_json_pointer("foo/bar"), vec!["foo", "bar"]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d"), vec!["a~b", "c/d"]);
/// ```
pub fn parse_json_pointer(pointer: &str) -> Path {
    let rest = pointer.strip_prefix('/').unwrap_or(pointer);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/').map(unescape_component).collect()
}

/// Format path components into a JSON Pointer string.
///
/// Returns an empty string for the root path.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["foo".to_string(), "a/b".to_string()]), "/foo/a~1b");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Joins a base pointer and a relative pointer.
///
/// The relative part may or may not start with `/`; an empty relative part
/// yields the base itself.
///
/// # Example
///
/// ```
/// use json_render_json_pointer::join_pointer;
///
/// assert_eq!(join_pointer("/todos/0", "title"), "/todos/0/title");
/// assert_eq!(join_pointer("/todos/0", "/done"), "/todos/0/done");
/// assert_eq!(join_pointer("/todos/0", ""), "/todos/0");
/// ```
pub fn join_pointer(base: &str, relative: &str) -> String {
    let relative = relative.strip_prefix('/').unwrap_or(relative);
    let base = base.strip_suffix('/').unwrap_or(base);
    if relative.is_empty() {
        return base.to_string();
    }
    format!("{base}/{relative}")
}

/// Check if a path points to the root value.
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// Check if a string consists only of ASCII digits.
pub fn is_integer(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses an array index step. Leading zeros are accepted (`"01"` is `1`);
/// anything that is not all digits, including `-`, is not an index.
pub(crate) fn parse_index(step: &str) -> Option<usize> {
    if !is_integer(step) {
        return None;
    }
    step.parse().ok()
}
