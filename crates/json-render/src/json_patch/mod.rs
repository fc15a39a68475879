//! JSON Patch (RFC 6902) with lenient semantics for streamed documents.
//!
//! # Operations
//!
//! `add`, `remove`, `replace`, `move`, `copy`, `test`.
//!
//! Differences from strict RFC 6902:
//!
//! - `replace` does not require the target to exist.
//! - `remove`, `move` and `copy` on paths that do not resolve are no-ops.
//! - `move`/`copy` without `from` are no-ops.
//!
//! `test` is the only operation that can fail.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_op, apply_ops};
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};
pub use types::{Op, PatchError};
