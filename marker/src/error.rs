//! Marker Error Types
//!
//! This module defines the error enums used across the grading pipeline:
//!
//! - [`RubricError`]: problems with rubric configuration or lookup.
//! - [`ParseError`]: a model reply that cannot be turned into a [`GradingResult`](crate::types::GradingResult).
//! - [`MarkerError`]: the umbrella type returned by jobs, generators and request validation.
//!
//! Configuration errors are meant to stop the process at startup. Lookup and parse errors
//! are returned to the caller, who decides whether to retry the model or surface a
//! "grading failed, please try again" message.
//!
//! # Example
//!
//! ```rust
//! use marker::error::{MarkerError, RubricError};
//!
//! fn require_title(title: &str) -> Result<(), MarkerError> {
//!     if title.is_empty() {
//!         return Err(RubricError::NotFound(title.to_string()).into());
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors raised while loading or looking up rubrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RubricError {
    /// A rubric definition violates one of the rubric invariants.
    #[error("invalid rubric '{rubric}': {message}")]
    Configuration { rubric: String, message: String },
    /// No rubric is defined for the requested title.
    #[error("rubric not defined for this title: '{0}'")]
    NotFound(String),
}

impl RubricError {
    pub(crate) fn config(rubric: impl Into<String>, message: impl Into<String>) -> Self {
        RubricError::Configuration {
            rubric: rubric.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while validating a model reply against a rubric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The reply (after fence stripping) is not valid JSON.
    #[error("reply is not valid JSON: {0}")]
    MalformedJson(String),
    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(String),
    /// A field is present but has the wrong JSON type.
    #[error("field '{field}' must be {expected}")]
    WrongType { field: String, expected: &'static str },
    /// `parts` does not have one entry per rubric part.
    #[error("expected {expected} part(s) in reply, found {found}")]
    PartCountMismatch { expected: usize, found: usize },
    /// The grade label is not defined for that rubric part.
    #[error("grade '{grade}' is not defined for part '{part}'")]
    InvalidGrade { part: String, grade: String },
    /// A score lies outside its permitted range.
    #[error("score {score} for '{field}' is outside {min}..={max}")]
    ScoreOutOfRange {
        field: String,
        score: i64,
        min: u32,
        max: u32,
    },
    /// The stated total differs from the sum of part scores.
    #[error("stated total {stated} does not match sum of part scores {computed}")]
    TotalMismatch { stated: u32, computed: u32 },
}

impl ParseError {
    /// Whether calling the model again is a sensible reaction.
    ///
    /// Formatting problems are worth a retry. An unknown grade or an out-of-range score
    /// usually means the reply was produced against a different rubric, which a retry
    /// rarely fixes.
    pub fn is_retryable(&self) -> bool {
        match self {
            ParseError::MalformedJson(_)
            | ParseError::MissingField(_)
            | ParseError::WrongType { .. }
            | ParseError::PartCountMismatch { .. }
            | ParseError::TotalMismatch { .. } => true,
            ParseError::InvalidGrade { .. } | ParseError::ScoreOutOfRange { .. } => false,
        }
    }
}

/// Represents all error types that can occur in the marker system.
#[derive(Debug, Error)]
pub enum MarkerError {
    #[error(transparent)]
    Rubric(#[from] RubricError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The grading request failed input validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The text generation service failed or returned an unusable body.
    #[error("text generation failed: {0}")]
    Backend(String),
    /// I/O error (file not found, unreadable, etc.).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
