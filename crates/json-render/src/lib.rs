//! json-render: compile model-generated UI documents from streamed patches.
//!
//! A language model emits a document as newline-delimited JSON Patch
//! operations, possibly interleaved with prose. This crate turns that stream
//! into a growing JSON document and keeps the state model the document's
//! expressions are evaluated against.
//!
//! - [`json_patch`]: lenient RFC 6902 operations and their JSON codec
//! - [`spec_stream`]: chunk-tolerant JSONL compiler
//! - [`mixed_stream`]: line classifier for prose mixed with patches
//! - [`transform`]: character-level variant that forwards prose immediately
//! - [`state_store`]: state snapshots with subscribers
//! - [`state_tree`]: persistent JSON tree the snapshots share branches through
//! - [`spec`]: typed view of the compiled document plus structural checks
//!
//! Expression evaluation lives in `json-render-expression`, re-exported as
//! [`expression`].
//!
//! # Example
//!
//! ```
//! use json_render::{SpecStreamCompiler, Spec};
//!
//! let mut compiler = SpecStreamCompiler::new();
//! compiler.push("{\"op\":\"add\",\"path\":\"/root\",\"value\":\"card\"}\n{\"op\":\"add\",").unwrap();
//! compiler.push("\"path\":\"/elements/card\",\"value\":{\"type\":\"Card\",\"props\":{}}}\n").unwrap();
//!
//! let spec = Spec::from_value(compiler.get_result().unwrap()).unwrap();
//! assert_eq!(spec.root_element().unwrap().element_type, "Card");
//! assert_eq!(compiler.get_patches().len(), 2);
//! ```

pub mod json_patch;
pub mod mixed_stream;
pub mod spec;
pub mod spec_stream;
pub mod state_store;
pub mod state_tree;
pub mod transform;

pub use json_render_expression as expression;
pub use json_render_json_pointer as json_pointer;

pub use json_patch::{apply_op, apply_ops, Op, PatchError};
pub use mixed_stream::{classify, classify_with, Classified, MixedStreamParser, MixedStreamSink};
pub use spec::{validate_spec, RepeatConfig, Spec, SpecIssue, UIElement};
pub use spec_stream::{
    apply_spec_stream_patch, compile_spec_stream, parse_spec_stream_line, SpecStreamCompiler,
    StreamError, StreamOptions, StreamUpdate,
};
pub use state_store::StateStore;
pub use state_tree::StateNode;
pub use transform::{SpecStreamTransform, StreamPart};
