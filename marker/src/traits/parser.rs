//! Parser Trait
//!
//! This module defines the [`Parser`] trait, which provides a generic interface for parsing
//! raw input into strongly-typed Rust structures. Implementations are responsible for
//! validating the input and converting it into the appropriate domain model, returning a
//! [`ParseError`] that says exactly what was wrong.
//!
//! # Example
//!
//! ```rust
//! use marker::error::ParseError;
//! use marker::traits::parser::Parser;
//!
//! struct ScoreParser;
//!
//! impl<'a> Parser<&'a str, u32> for ScoreParser {
//!     fn parse(&self, raw: &'a str) -> Result<u32, ParseError> {
//!         raw.trim()
//!             .parse()
//!             .map_err(|_| ParseError::MalformedJson(raw.to_string()))
//!     }
//! }
//!
//! assert_eq!(ScoreParser.parse(" 7 ").unwrap(), 7);
//! ```

use crate::error::ParseError;

/// A generic trait for parsing data into a strongly-typed Rust structure.
///
/// # Type Parameters
///
/// * `Input` - The input type to be parsed.
/// * `Output` - The output type produced by the parser.
pub trait Parser<Input, Output> {
    /// Parse an input value into the target type.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the input does not conform to the expected schema.
    fn parse(&self, input: Input) -> Result<Output, ParseError>;
}
