//! On-disk rubric definitions.
//!
//! Rubric files are JSON arrays of [`RubricDefinition`]s. Score ranges are kept as the
//! display strings editors write (`"21-19"`, `"2"`) and are parsed into integer bounds
//! exactly once, when a definition is converted into a [`Rubric`].
//!
//! ```json
//! [
//!   {
//!     "title": "擬社會互動的特徵與影響",
//!     "description": "...",
//!     "total": 25,
//!     "parts": [
//!       {
//!         "partTitle": "第一小題",
//!         "weight": 4,
//!         "criteria": [
//!           { "grade": "A", "scoreRange": "4-3", "description": "..." },
//!           { "grade": "0", "scoreRange": "0", "description": "..." }
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! ```

use super::{Grade, GradeBand, Part, Rubric};
use crate::error::RubricError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RubricDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub total: u32,
    pub parts: Vec<PartDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartDefinition {
    #[serde(rename = "partTitle")]
    pub part_title: String,
    pub weight: u32,
    pub criteria: Vec<CriterionDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionDefinition {
    pub grade: String,
    #[serde(rename = "scoreRange")]
    pub score_range: String,
    pub description: String,
}

impl TryFrom<RubricDefinition> for Rubric {
    type Error = RubricError;

    /// Parses labels and ranges, then checks the rubric invariants.
    fn try_from(def: RubricDefinition) -> Result<Self, Self::Error> {
        let title = def.title;
        let parts = def
            .parts
            .into_iter()
            .map(|part| {
                let bands = part
                    .criteria
                    .into_iter()
                    .map(|c| {
                        let grade = c.grade.parse::<Grade>().map_err(|e| {
                            RubricError::config(&title, format!("part '{}': {e}", part.part_title))
                        })?;
                        GradeBand::new(grade, c.score_range, c.description).map_err(|e| {
                            RubricError::config(&title, format!("part '{}': {e}", part.part_title))
                        })
                    })
                    .collect::<Result<Vec<_>, RubricError>>()?;
                Ok(Part {
                    title: part.part_title,
                    weight: part.weight,
                    bands,
                })
            })
            .collect::<Result<Vec<_>, RubricError>>()?;

        let rubric = Rubric {
            title,
            description: def.description,
            total: def.total,
            parts,
        };
        rubric.validate()?;
        Ok(rubric)
    }
}

impl From<&Rubric> for RubricDefinition {
    fn from(rubric: &Rubric) -> Self {
        RubricDefinition {
            title: rubric.title.clone(),
            description: rubric.description.clone(),
            total: rubric.total,
            parts: rubric
                .parts
                .iter()
                .map(|p| PartDefinition {
                    part_title: p.title.clone(),
                    weight: p.weight,
                    criteria: p
                        .bands
                        .iter()
                        .map(|b| CriterionDefinition {
                            grade: b.grade.to_string(),
                            score_range: b.range_label.clone(),
                            description: b.description.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::ScoreRange;
    use crate::rubric::tests::sample_rubric;
    use serde_json::json;

    #[test]
    fn converts_a_valid_definition() {
        let def: RubricDefinition = serde_json::from_value(json!({
            "title": "單題",
            "total": 25,
            "parts": [{
                "partTitle": "綜合評分",
                "weight": 25,
                "criteria": [
                    { "grade": "A", "scoreRange": "22-25", "description": "好" },
                    { "grade": "B", "scoreRange": "1-21", "description": "普通" },
                    { "grade": "0", "scoreRange": "0", "description": "空白" }
                ]
            }]
        }))
        .unwrap();
        let rubric = Rubric::try_from(def).unwrap();
        assert_eq!(rubric.description, "");
        assert_eq!(rubric.parts[0].bands[0].range, ScoreRange::new(22, 25));
        assert_eq!(rubric.parts[0].bands[0].range_label, "22-25");
    }

    #[test]
    fn unknown_grade_label_is_a_configuration_error() {
        let mut def = RubricDefinition::from(&sample_rubric());
        def.parts[0].criteria[1].grade = "D".into();
        let err = Rubric::try_from(def).unwrap_err();
        assert!(matches!(err, RubricError::Configuration { ref rubric, .. } if rubric == "X"));
        assert!(err.to_string().contains("unknown grade label 'D'"));
    }

    #[test]
    fn unparseable_range_is_a_configuration_error() {
        let mut def = RubricDefinition::from(&sample_rubric());
        def.parts[1].criteria[0].score_range = "滿分".into();
        assert!(Rubric::try_from(def).is_err());
    }

    #[test]
    fn definition_round_trips_through_rubric() {
        let rubric = sample_rubric();
        let back = Rubric::try_from(RubricDefinition::from(&rubric)).unwrap();
        assert_eq!(back, rubric);
    }
}
