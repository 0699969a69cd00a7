//! Grading Reply Parser
//!
//! This module provides the [`GradingReplyParser`] for turning a model's raw reply into a
//! [`GradingResult`] checked against the [`Rubric`] it was graded with.
//!
//! # JSON Schema
//!
//! ```json
//! {
//!   "total": <int 0..=rubric.total>,
//!   "parts": [
//!     { "part": "<label>", "grade": "<grade of that part>", "score": <int in grade range>, "reason": "<text>" },
//!     ...
//!   ],
//!   "grammar_analysis": { "score": <int 0..=10>, "comment": "<text>" },
//!   "vocabulary_usage": { "score": <int 0..=10>, "comment": "<text>" },
//!   "structure_issues": { "score": <int 0..=10>, "comment": "<text>" },
//!   "summary": "<text>"
//! }
//! ```
//!
//! - The reply may be wrapped in a markdown code fence; it is stripped first.
//! - `parts` must have exactly one entry per rubric part, in rubric order.
//! - Every grade must be declared by that rubric part and every score must fall inside
//!   the range of the chosen grade.
//! - Extra fields are ignored.
//!
//! # Total consistency
//!
//! Models do not always add up correctly. With [`TotalPolicy::Warn`] (the default) the
//! stated `total` is kept and a [`ValidationWarning::TotalMismatch`] is attached; with
//! [`TotalPolicy::Reject`] the reply fails with [`ParseError::TotalMismatch`].

use crate::error::ParseError;
use crate::rubric::{Grade, Part, Rubric};
use crate::scorer::computed_total;
use crate::traits::parser::Parser;
use crate::types::{AuxiliaryScore, GradingResult, PartScore, ValidatedGrading, ValidationWarning};
use crate::utilities::code_fence::strip_code_fence;
use serde_json::{Map, Value};
use tracing::warn;

/// Upper bound of the auxiliary dimension scores.
pub const AUXILIARY_MAX: u32 = 10;

/// What to do when `total` differs from the sum of part scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalPolicy {
    /// Keep the stated total and record a warning.
    #[default]
    Warn,
    /// Fail with [`ParseError::TotalMismatch`].
    Reject,
}

/// Validates model replies against one rubric.
#[derive(Debug, Clone, Copy)]
pub struct GradingReplyParser<'r> {
    rubric: &'r Rubric,
    total_policy: TotalPolicy,
}

impl<'r> GradingReplyParser<'r> {
    pub fn new(rubric: &'r Rubric) -> Self {
        Self {
            rubric,
            total_policy: TotalPolicy::default(),
        }
    }

    pub fn with_total_policy(mut self, policy: TotalPolicy) -> Self {
        self.total_policy = policy;
        self
    }

    fn parse_part(&self, index: usize, part: &Part, raw: &Value) -> Result<PartScore, ParseError> {
        let path = format!("parts[{index}]");
        let obj = raw.as_object().ok_or_else(|| ParseError::WrongType {
            field: path.clone(),
            expected: "an object",
        })?;

        let label = string_field(obj, "part", &path)?;
        let grade_label = string_field(obj, "grade", &path)?;
        let score = integer_field(obj, "score", &path)?;
        let reason = string_field(obj, "reason", &path)?;

        let band = grade_label
            .parse::<Grade>()
            .ok()
            .and_then(|g| part.band(g))
            .ok_or_else(|| ParseError::InvalidGrade {
                part: part.title.clone(),
                grade: grade_label.clone(),
            })?;
        let score = bounded(
            score,
            &format!("{path}.score"),
            band.range.low,
            band.range.high,
        )?;

        Ok(PartScore {
            part: label,
            grade: band.grade,
            score,
            reason,
        })
    }
}

impl<'a, 'r> Parser<&'a str, ValidatedGrading> for GradingReplyParser<'r> {
    /// Parses and validates a raw model reply.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    fn parse(&self, raw: &'a str) -> Result<ValidatedGrading, ParseError> {
        let body = strip_code_fence(raw);
        let value: Value =
            serde_json::from_str(body).map_err(|e| ParseError::MalformedJson(e.to_string()))?;
        let obj = value.as_object().ok_or_else(|| ParseError::WrongType {
            field: "reply".to_string(),
            expected: "a JSON object",
        })?;

        let stated_total = integer_field(obj, "total", "")?;
        let total = bounded(stated_total, "total", 0, self.rubric.total)?;

        let raw_parts = required(obj, "parts", "")?
            .as_array()
            .ok_or_else(|| ParseError::WrongType {
                field: "parts".to_string(),
                expected: "an array",
            })?;
        if raw_parts.len() != self.rubric.parts.len() {
            return Err(ParseError::PartCountMismatch {
                expected: self.rubric.parts.len(),
                found: raw_parts.len(),
            });
        }

        let parts = self
            .rubric
            .parts
            .iter()
            .zip(raw_parts)
            .enumerate()
            .map(|(i, (part, raw))| self.parse_part(i, part, raw))
            .collect::<Result<Vec<_>, _>>()?;

        let grammar_analysis = auxiliary_field(obj, "grammar_analysis")?;
        let vocabulary_usage = auxiliary_field(obj, "vocabulary_usage")?;
        let structure_issues = auxiliary_field(obj, "structure_issues")?;
        let summary = string_field(obj, "summary", "")?;

        let mut warnings = Vec::new();

        for (index, (scored, part)) in parts.iter().zip(&self.rubric.parts).enumerate() {
            if scored.part.trim() != part.title {
                warn!(
                    rubric = %self.rubric.title,
                    index,
                    expected = %part.title,
                    found = %scored.part,
                    "Model relabelled a rubric part; keeping rubric order"
                );
                warnings.push(ValidationWarning::PartLabelMismatch {
                    index,
                    expected: part.title.clone(),
                    found: scored.part.clone(),
                });
            }
        }

        let computed = computed_total(&parts);
        if computed != total {
            match self.total_policy {
                TotalPolicy::Reject => {
                    return Err(ParseError::TotalMismatch {
                        stated: total,
                        computed,
                    });
                }
                TotalPolicy::Warn => {
                    warn!(
                        rubric = %self.rubric.title,
                        stated = total,
                        computed,
                        "Model total does not match sum of part scores; keeping stated total"
                    );
                    warnings.push(ValidationWarning::TotalMismatch {
                        stated: total,
                        computed,
                    });
                }
            }
        }

        Ok(ValidatedGrading {
            result: GradingResult {
                total,
                parts,
                grammar_analysis,
                vocabulary_usage,
                structure_issues,
                summary,
            },
            warnings,
        })
    }
}

/// Parses a reply with the default (lenient) total policy, dropping warnings.
pub fn parse_reply(raw: &str, rubric: &Rubric) -> Result<GradingResult, ParseError> {
    GradingReplyParser::new(rubric).parse(raw).map(|v| v.result)
}

fn field_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn required<'v>(obj: &'v Map<String, Value>, key: &str, parent: &str) -> Result<&'v Value, ParseError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ParseError::MissingField(field_path(parent, key))),
        Some(v) => Ok(v),
    }
}

fn integer_field(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<i64, ParseError> {
    required(obj, key, parent)?
        .as_i64()
        .ok_or_else(|| ParseError::WrongType {
            field: field_path(parent, key),
            expected: "an integer",
        })
}

fn string_field(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<String, ParseError> {
    required(obj, key, parent)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ParseError::WrongType {
            field: field_path(parent, key),
            expected: "a string",
        })
}

fn auxiliary_field(obj: &Map<String, Value>, key: &str) -> Result<AuxiliaryScore, ParseError> {
    let inner = required(obj, key, "")?
        .as_object()
        .ok_or_else(|| ParseError::WrongType {
            field: key.to_string(),
            expected: "an object",
        })?;
    let score = integer_field(inner, "score", key)?;
    Ok(AuxiliaryScore {
        score: bounded(score, &field_path(key, "score"), 0, AUXILIARY_MAX)?,
        comment: string_field(inner, "comment", key)?,
    })
}

fn bounded(score: i64, field: &str, min: u32, max: u32) -> Result<u32, ParseError> {
    if score < i64::from(min) || score > i64::from(max) {
        return Err(ParseError::ScoreOutOfRange {
            field: field.to_string(),
            score,
            min,
            max,
        });
    }
    Ok(score as u32)
}
