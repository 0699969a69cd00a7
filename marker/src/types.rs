//! # Types Module
//!
//! The typed form of a model's grading reply, plus the warnings the validator may attach.

use crate::rubric::Grade;
use serde::{Deserialize, Serialize};

/// A grading reply that passed structural and rubric validation.
///
/// Field names match the JSON shape requested in the grading prompt, so a result
/// serializes back to exactly what the model was asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    pub total: u32,
    /// One entry per rubric part, in rubric order.
    pub parts: Vec<PartScore>,
    pub grammar_analysis: AuxiliaryScore,
    pub vocabulary_usage: AuxiliaryScore,
    pub structure_issues: AuxiliaryScore,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartScore {
    pub part: String,
    pub grade: Grade,
    pub score: u32,
    pub reason: String,
}

/// A 0..=10 score on one of the fixed auxiliary dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryScore {
    pub score: u32,
    pub comment: String,
}

/// Something suspicious in a reply that does not make it unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// The model's `total` is kept as stated but differs from the sum of part scores.
    TotalMismatch { stated: u32, computed: u32 },
    /// The reply labelled a part differently from the rubric.
    PartLabelMismatch {
        index: usize,
        expected: String,
        found: String,
    },
}

/// A [`GradingResult`] together with any warnings raised while validating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGrading {
    pub result: GradingResult,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedGrading {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
