//! # Parsers
//!
//! This module is responsible for turning external, untrusted text into typed values.
//! Parsers implement the [`Parser`](crate::traits::parser::Parser) trait, ensuring a
//! consistent interface and error type.
//!
//! The available parsers are:
//! - [`grading_parser`]: For validating a language model's grading reply against a rubric.

pub mod grading_parser;
