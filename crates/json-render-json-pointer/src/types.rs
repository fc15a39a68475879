//! Type definitions for JSON Pointer.

/// A step in a JSON Pointer path: an object key or a base-10 array index,
/// already unescaped.
pub type PathStep = String;

/// A parsed JSON Pointer path.
pub type Path = Vec<PathStep>;
