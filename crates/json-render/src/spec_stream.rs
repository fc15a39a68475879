//! Streaming JSONL compiler.
//!
//! Text arrives in arbitrary chunks. Complete lines are parsed as patch
//! operations and applied to a growing document; the trailing partial line is
//! held back until its newline (or [`SpecStreamCompiler::get_result`]) arrives.
//! Lines that are not patches yet, or never will be, are dropped.

use json_render_util::BoundedSet;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::json_patch::{apply_op, from_json, Op, PatchError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StreamError {
    #[error(transparent)]
    Patch(#[from] PatchError),
    /// A line of a push failed. `applied` holds the operations the same push
    /// applied before it.
    #[error("{source} (after {} operations in this push)", .applied.len())]
    Interrupted { source: PatchError, applied: Vec<Op> },
}

impl StreamError {
    /// Operations the failing push applied before the failure.
    pub fn applied(&self) -> &[Op] {
        match self {
            StreamError::Interrupted { applied, .. } => applied,
            StreamError::Patch(_) => &[],
        }
    }
}

/// Options shared by the compiler, the classifier and the transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// A line equal to this (after trimming) opens a patches-only region.
    pub fence_open: String,
    /// A line equal to this (after trimming) closes it.
    pub fence_close: String,
    /// How many distinct lines the compiler remembers for deduplication.
    pub max_seen_lines: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            fence_open: "```spec".to_string(),
            fence_close: "```".to_string(),
            max_seen_lines: 10_000,
        }
    }
}

/// Parses one line as a patch operation.
///
/// Returns `None` for blank lines, `//` comments, lines that are not JSON,
/// and JSON that is not a well-formed operation.
pub fn parse_spec_stream_line(line: &str) -> Option<Op> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("//") || !line.starts_with('{') {
        return None;
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "dropping line that is not JSON");
            return None;
        }
    };
    match from_json(&value) {
        Ok(op) => Some(op),
        Err(err) => {
            debug!(error = %err, "dropping line that is not a patch");
            None
        }
    }
}

/// Applies one streamed operation to `doc`.
pub fn apply_spec_stream_patch(doc: &mut Value, op: &Op) -> Result<(), PatchError> {
    apply_op(doc, op)
}

/// Compiles a complete JSONL text in one call.
///
/// # Example
///
/// ```
/// use json_render::spec_stream::compile_spec_stream;
/// use serde_json::json;
///
/// let text = r#"{"op":"add","path":"/root","value":"main"}
/// {"op":"add","path":"/elements/main","value":{"type":"Card","props":{}}}"#;
/// let doc = compile_spec_stream(text, json!({})).unwrap();
/// assert_eq!(doc["root"], "main");
/// assert_eq!(doc["elements"]["main"]["type"], "Card");
/// ```
pub fn compile_spec_stream(text: &str, initial: Value) -> Result<Value, StreamError> {
    let mut compiler = SpecStreamCompiler::with_initial(initial);
    compiler.push(text)?;
    compiler.get_result()?;
    Ok(compiler.into_result())
}

/// What one [`SpecStreamCompiler::push`] changed.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamUpdate<'a> {
    /// The document after this push.
    pub result: &'a Value,
    /// Operations applied by this push, in order.
    pub new_patches: Vec<Op>,
}

#[derive(Debug, Clone)]
pub struct SpecStreamCompiler {
    result: Value,
    buffer: String,
    patches: Vec<Op>,
    seen: BoundedSet,
}

impl Default for SpecStreamCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecStreamCompiler {
    /// A compiler whose document starts as `{}`.
    pub fn new() -> Self {
        Self::with_initial(json!({}))
    }

    pub fn with_initial(initial: Value) -> Self {
        Self::with_options(initial, &StreamOptions::default())
    }

    pub fn with_options(initial: Value, options: &StreamOptions) -> Self {
        Self {
            result: initial,
            buffer: String::new(),
            patches: Vec::new(),
            seen: BoundedSet::new(options.max_seen_lines),
        }
    }

    /// Feeds a chunk. Every line it completes is processed.
    ///
    /// A failing `test` stops processing with [`StreamError::Interrupted`],
    /// which carries the operations applied before it. Lines after the
    /// failing one stay buffered and are processed by the next call.
    pub fn push(&mut self, chunk: &str) -> Result<StreamUpdate<'_>, StreamError> {
        self.buffer.push_str(chunk);
        let mut buffer = std::mem::take(&mut self.buffer);
        let mut new_patches = Vec::new();
        let mut consumed = 0;
        let mut failure = None;
        while let Some(offset) = buffer[consumed..].find('\n') {
            let end = consumed + offset + 1;
            let line = &buffer[consumed..end];
            consumed = end;
            match self.process_line(line) {
                Ok(Some(op)) => new_patches.push(op),
                Ok(None) => {}
                Err(source) => {
                    failure = Some(source);
                    break;
                }
            }
        }
        buffer.drain(..consumed);
        self.buffer = buffer;
        if let Some(source) = failure {
            return Err(StreamError::Interrupted {
                source,
                applied: new_patches,
            });
        }
        Ok(StreamUpdate {
            result: &self.result,
            new_patches,
        })
    }

    /// Processes whatever is still buffered as a final line and returns the
    /// document.
    pub fn get_result(&mut self) -> Result<&Value, StreamError> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(&line)?;
        }
        Ok(&self.result)
    }

    /// The document as of the last completed line, without flushing.
    pub fn result(&self) -> &Value {
        &self.result
    }

    pub fn into_result(self) -> Value {
        self.result
    }

    /// Every operation applied since construction or the last reset.
    pub fn get_patches(&self) -> &[Op] {
        &self.patches
    }

    /// Starts over from `{}`.
    pub fn reset(&mut self) {
        self.reset_with(json!({}));
    }

    /// Starts over from `initial`, dropping buffered text and history.
    pub fn reset_with(&mut self, initial: Value) {
        self.result = initial;
        self.buffer.clear();
        self.patches.clear();
        self.seen.clear();
    }

    fn process_line(&mut self, line: &str) -> Result<Option<Op>, PatchError> {
        let line = line.trim();
        if line.is_empty() || self.seen.contains(line) {
            return Ok(None);
        }
        let Some(op) = parse_spec_stream_line(line) else {
            return Ok(None);
        };
        apply_spec_stream_patch(&mut self.result, &op)?;
        self.seen.insert(line);
        self.patches.push(op.clone());
        Ok(Some(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_back_partial_lines() {
        let mut compiler = SpecStreamCompiler::new();
        let update = compiler.push(r#"{"op":"add","path":"/a","#).unwrap();
        assert!(update.new_patches.is_empty());
        assert_eq!(update.result, &json!({}));
        let update = compiler.push("\"value\":1}\n").unwrap();
        assert_eq!(update.new_patches.len(), 1);
        assert_eq!(update.result, &json!({"a": 1}));
    }

    #[test]
    fn get_result_flushes_the_tail() {
        let mut compiler = SpecStreamCompiler::new();
        compiler.push(r#"{"op":"add","path":"/a","value":1}"#).unwrap();
        assert_eq!(compiler.result(), &json!({}));
        assert_eq!(compiler.get_result().unwrap(), &json!({"a": 1}));
    }

    #[test]
    fn drops_noise() {
        let mut compiler = SpecStreamCompiler::new();
        let update = compiler
            .push("hello\n// {\"op\":\"add\",\"path\":\"/x\",\"value\":1}\n{\"op\":\"add\"}\n{oops\n\n")
            .unwrap();
        assert!(update.new_patches.is_empty());
        assert!(compiler.get_patches().is_empty());
    }

    #[test]
    fn duplicate_lines_apply_once() {
        let mut compiler = SpecStreamCompiler::new();
        let line = "{\"op\":\"add\",\"path\":\"/list/-\",\"value\":1}\n";
        compiler.push(line).unwrap();
        compiler.push(line).unwrap();
        compiler.push(&format!("  {}", line)).unwrap();
        assert_eq!(compiler.result(), &json!({"list": [1]}));
        assert_eq!(compiler.get_patches().len(), 1);
    }

    #[test]
    fn failed_test_surfaces_and_keeps_the_rest_buffered() {
        let mut compiler = SpecStreamCompiler::with_initial(json!({"a": 1}));
        let text = concat!(
            "{\"op\":\"test\",\"path\":\"/a\",\"value\":2}\n",
            "{\"op\":\"add\",\"path\":\"/b\",\"value\":2}\n",
        );
        let err = compiler.push(text).unwrap_err();
        assert!(err.to_string().contains("/a"));
        assert_eq!(compiler.result(), &json!({"a": 1}));
        assert!(compiler.get_patches().is_empty());
        compiler.push("").unwrap();
        assert_eq!(compiler.result(), &json!({"a": 1, "b": 2}));
    }

    #[test]
    fn failed_test_reports_what_the_push_applied() {
        let mut compiler = SpecStreamCompiler::new();
        let text = concat!(
            "{\"op\":\"add\",\"path\":\"/a\",\"value\":1}\n",
            "{\"op\":\"add\",\"path\":\"/b\",\"value\":2}\n",
            "{\"op\":\"test\",\"path\":\"/a\",\"value\":9}\n",
            "{\"op\":\"add\",\"path\":\"/c\",\"value\":3}\n",
        );
        let err = compiler.push(text).unwrap_err();
        let paths: Vec<&str> = err.applied().iter().map(Op::path).collect();
        assert_eq!(paths, vec!["/a", "/b"]);
        assert!(matches!(err, StreamError::Interrupted { .. }));
        assert_eq!(compiler.get_patches(), err.applied());

        let update = compiler.push("").unwrap();
        assert_eq!(update.new_patches.len(), 1);
        assert_eq!(update.result, &json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn many_lines_in_one_push() {
        let text: String = (0..5_000)
            .map(|i| format!("{{\"op\":\"add\",\"path\":\"/n/-\",\"value\":{i}}}\n"))
            .collect();
        let mut compiler = SpecStreamCompiler::with_initial(json!({"n": []}));
        let update = compiler.push(&format!("{text}{{\"op\"")).unwrap();
        assert_eq!(update.new_patches.len(), 5_000);
        assert_eq!(compiler.result()["n"][4_999], 4_999);
        compiler.push(":\"add\",\"path\":\"/done\",\"value\":true}\n").unwrap();
        assert_eq!(compiler.result()["done"], true);
    }

    #[test]
    fn reset_clears_everything() {
        let mut compiler = SpecStreamCompiler::new();
        compiler.push("{\"op\":\"add\",\"path\":\"/a\",\"value\":1}\n{\"op\"").unwrap();
        compiler.reset_with(json!({"b": true}));
        assert!(compiler.get_patches().is_empty());
        assert_eq!(compiler.get_result().unwrap(), &json!({"b": true}));
        compiler.push("{\"op\":\"add\",\"path\":\"/a\",\"value\":1}\n").unwrap();
        assert_eq!(compiler.result(), &json!({"a": 1, "b": true}));
    }

    #[test]
    fn seen_lines_are_bounded() {
        let options = StreamOptions {
            max_seen_lines: 1,
            ..StreamOptions::default()
        };
        let mut compiler = SpecStreamCompiler::with_options(json!({"n": []}), &options);
        let a = "{\"op\":\"add\",\"path\":\"/n/-\",\"value\":\"a\"}\n";
        let b = "{\"op\":\"add\",\"path\":\"/n/-\",\"value\":\"b\"}\n";
        compiler.push(a).unwrap();
        compiler.push(b).unwrap();
        compiler.push(a).unwrap();
        assert_eq!(compiler.result(), &json!({"n": ["a", "b", "a"]}));
    }
}
