//!
//! Traits Module
//!
//! This module contains core traits used throughout the marker system for extensibility and abstraction.
//!
//! - [`parser`]: Defines the generic trait for parsing raw input into Rust types.
//! - [`generator`]: Defines the seam to the external text generation service.
//!
//! Implement these traits to plug in new reply formats or model providers.

pub mod generator;
pub mod parser;
