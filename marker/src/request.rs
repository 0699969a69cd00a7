//! Grading request input.
//!
//! A [`GradingRequest`] is what the submission screen hands over: the chosen essay
//! prompt title and the (possibly OCR'd and edited) essay text. It is checked with the
//! `validator` crate before any rubric lookup or model call happens.

use crate::error::MarkerError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GradingRequest {
    #[validate(custom(function = "not_blank_title"))]
    pub title: String,

    #[validate(custom(function = "not_blank_essay"))]
    pub essay_text: String,
}

impl GradingRequest {
    pub fn new(title: impl Into<String>, essay_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            essay_text: essay_text.into(),
        }
    }

    /// Runs the field validators, folding all messages into one [`MarkerError::InvalidRequest`].
    pub fn check(&self) -> Result<(), MarkerError> {
        self.validate()
            .map_err(|errors| MarkerError::InvalidRequest(format_validation_errors(&errors)))
    }
}

fn blank(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn not_blank_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(blank("blank_title", "Please choose an essay prompt first"));
    }
    Ok(())
}

fn not_blank_essay(essay: &str) -> Result<(), ValidationError> {
    if essay.trim().is_empty() {
        return Err(blank("blank_essay", "Essay text cannot be empty"));
    }
    Ok(())
}

/// Joins every field error message, in field-name order, with `"; "`.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(_, errs)| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
