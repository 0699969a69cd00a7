//! # Utilities
//!
//! Small text helpers shared by the parsers.
//!
//! - [`code_fence`]: removes the markdown fences models wrap around JSON replies.

pub mod code_fence;
