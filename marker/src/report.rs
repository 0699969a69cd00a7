//! # Score Report Module
//!
//! This module defines the record stored after an essay has been graded, and the response
//! envelope used to hand it to clients.
//!
//! ## Overview
//!
//! - [`ScoreRecord`]: everything the score history needs, ready to be written to the
//!   external store. The auxiliary dimensions are duplicated as top-level fields so the
//!   store can keep them in their own columns next to the full `feedback_json`.
//! - [`ScoreReportResponse`]: wraps a [`ScoreRecord`] with `success` and `message` fields.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Grading complete.",
//!   "data": {
//!     "rubric_title": "擬社會互動的特徵與影響",
//!     "total_score": 20,
//!     "grade": "A",
//!     "feedback_json": { "total": 20, "parts": [ ... ], "summary": "..." },
//!     "grammar_analysis": { "score": 8, "comment": "..." },
//!     "vocabulary_usage": { "score": 7, "comment": "..." },
//!     "structure_issues": { "score": 8, "comment": "..." },
//!     "warnings": [],
//!     "created_at": "2026-10-16T08:00:00Z"
//!   }
//! }
//! ```

use crate::rubric::{Grade, Rubric};
use crate::scorer::overall_grade;
use crate::types::{AuxiliaryScore, GradingResult, ValidatedGrading, ValidationWarning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted outcome of grading one essay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub rubric_title: String,
    pub total_score: u32,
    /// Display grade derived from `total_score`.
    pub grade: Grade,
    pub feedback_json: GradingResult,
    pub grammar_analysis: AuxiliaryScore,
    pub vocabulary_usage: AuxiliaryScore,
    pub structure_issues: AuxiliaryScore,
    #[serde(default)]
    pub warnings: Vec<ValidationWarning>,
    pub created_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(rubric: &Rubric, graded: ValidatedGrading) -> Self {
        Self::at(rubric, graded, Utc::now())
    }

    /// Same as [`ScoreRecord::new`] with an explicit timestamp.
    pub fn at(rubric: &Rubric, graded: ValidatedGrading, created_at: DateTime<Utc>) -> Self {
        let ValidatedGrading { result, warnings } = graded;
        ScoreRecord {
            rubric_title: rubric.title.clone(),
            total_score: result.total,
            grade: overall_grade(result.total, rubric.total),
            grammar_analysis: result.grammar_analysis.clone(),
            vocabulary_usage: result.vocabulary_usage.clone(),
            structure_issues: result.structure_issues.clone(),
            feedback_json: result,
            warnings,
            created_at,
        }
    }
}

/// The response envelope for a grading run.
#[derive(Debug, Serialize)]
pub struct ScoreReportResponse {
    success: bool,
    message: String,
    data: ScoreRecord,
}

impl From<ScoreRecord> for ScoreReportResponse {
    fn from(record: ScoreRecord) -> Self {
        let message = if record.warnings.is_empty() {
            "Grading complete.".to_string()
        } else {
            format!("Grading complete with {} warning(s).", record.warnings.len())
        };
        ScoreReportResponse {
            success: true,
            message,
            data: record,
        }
    }
}
