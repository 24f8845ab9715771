//! Capability accessors
//!
//! Each trait exposes one narrow view of a resource. A resource type
//! implements only the capabilities it actually has, and filters are written
//! against these traits rather than concrete types.

use std::collections::HashMap;

/// Unix timestamp (seconds) used by the day-based filters
pub trait HasCreatedAt {
    fn created_at(&self) -> i64;
}

/// Element count (messages in a thread), never a byte size
pub trait HasLength {
    fn length(&self) -> usize;
}

pub trait HasName {
    fn name(&self) -> &str;
}

/// Ordered text fragments, e.g. one per message
pub trait HasContent {
    fn content(&self) -> Vec<&str>;
}

/// String-keyed, string-valued metadata; `None` behaves as an empty map
pub trait HasMetadata {
    fn metadata(&self) -> Option<&HashMap<String, String>>;
}
