//! json-render-util - Utility functions shared by the json-render crates.
//!
//! Deep JSON equality (used by the `test` patch operation, visibility
//! comparisons and the state store's change detection) and a bounded
//! deduplication set.

pub mod bounded_set;
pub mod json_equal;

// Re-exports for convenience
pub use bounded_set::BoundedSet;
pub use json_equal::{deep_equal, deep_equal_opt};
