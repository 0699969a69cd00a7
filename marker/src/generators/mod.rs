//! # Text Generators
//!
//! Implementations of [`TextGenerator`](crate::traits::generator::TextGenerator) for the
//! model providers the grader can talk to.
//!
//! - [`gemini`]: Google's Gemini `generateContent` endpoint.

pub mod gemini;
