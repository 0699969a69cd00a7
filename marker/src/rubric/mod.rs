//! # Rubric Model
//!
//! A [`Rubric`] is the grading standard for one essay prompt. It is split into weighted
//! [`Part`]s, and every part lists its [`GradeBand`]s from the best grade down to the
//! zero band. Each band owns a closed integer [`ScoreRange`].
//!
//! Rubrics are loaded once, validated with [`Rubric::validate`], and never mutated.
//! The invariants checked are:
//!
//! - the rubric has at least one part and `sum(part.weight) == total`;
//! - within a part, grades are strictly descending (`A+ > A > B+ > B > C+ > C > 0`);
//! - the band ranges partition `0..=weight` with no gaps or overlaps, starting at
//!   `weight` and ending with the `0` band covering exactly `0`.

pub mod definition;
pub mod store;

use crate::error::RubricError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A grade label. Ordering follows grading quality, so `Grade::APlus` is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// All grades, best first.
    pub const DESCENDING: [Grade; 7] = [
        Grade::APlus,
        Grade::A,
        Grade::BPlus,
        Grade::B,
        Grade::CPlus,
        Grade::C,
        Grade::Zero,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::Zero => "0",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::DESCENDING
            .into_iter()
            .find(|g| g.label() == s.trim())
            .ok_or_else(|| format!("unknown grade label '{s}'"))
    }
}

/// A closed, inclusive integer interval of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreRange {
    pub low: u32,
    pub high: u32,
}

impl ScoreRange {
    pub fn new(a: u32, b: u32) -> Self {
        ScoreRange {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn single(score: u32) -> Self {
        ScoreRange {
            low: score,
            high: score,
        }
    }

    pub fn contains(&self, score: u32) -> bool {
        (self.low..=self.high).contains(&score)
    }
}

/// Rendered as `high-low`, or a single number when both bounds agree.
impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.high)
        } else {
            write!(f, "{}-{}", self.high, self.low)
        }
    }
}

/// Accepts `"21-19"`, `"22-25"` (either order) and `"2"`.
impl FromStr for ScoreRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bound = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid score range '{s}'"))
        };
        match s.split_once('-') {
            Some((a, b)) => Ok(ScoreRange::new(bound(a)?, bound(b)?)),
            None => Ok(ScoreRange::single(bound(s)?)),
        }
    }
}

/// One qualitative tier of a rubric part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeBand {
    pub grade: Grade,
    pub range: ScoreRange,
    /// The range exactly as the rubric file wrote it; prompts quote this text.
    pub range_label: String,
    pub description: String,
}

impl GradeBand {
    /// Parses `range_label` and keeps it for display.
    pub fn new(
        grade: Grade,
        range_label: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, String> {
        let range_label = range_label.into().trim().to_string();
        Ok(GradeBand {
            grade,
            range: range_label.parse()?,
            range_label,
            description: description.into(),
        })
    }
}

/// A weighted sub-question of a rubric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub title: String,
    pub weight: u32,
    pub bands: Vec<GradeBand>,
}

impl Part {
    /// The band declared for `grade`, if this part defines it.
    pub fn band(&self, grade: Grade) -> Option<&GradeBand> {
        self.bands.iter().find(|b| b.grade == grade)
    }


    fn validate(&self, rubric: &str) -> Result<(), RubricError> {
        let at = |msg: String| RubricError::config(rubric, format!("part '{}': {msg}", self.title));

        if self.title.trim().is_empty() {
            return Err(RubricError::config(rubric, "part title must not be empty"));
        }
        if self.weight == 0 {
            return Err(at("weight must be positive".into()));
        }
        let (first, last) = match (self.bands.first(), self.bands.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(at("no grade bands defined".into())),
        };
        if first.range.high != self.weight {
            return Err(at(format!(
                "highest band '{}' tops out at {} but the part is worth {}",
                first.grade, first.range.high, self.weight
            )));
        }
        for pair in self.bands.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            if lower.grade >= upper.grade {
                return Err(at(format!(
                    "grade '{}' must rank below '{}'",
                    lower.grade, upper.grade
                )));
            }
            if lower.range.high.checked_add(1) != Some(upper.range.low) {
                return Err(at(format!(
                    "ranges of '{}' ({}) and '{}' ({}) leave a gap or overlap",
                    upper.grade, upper.range, lower.grade, lower.range
                )));
            }
        }
        if last.grade != Grade::Zero || last.range != ScoreRange::single(0) {
            return Err(at("last band must be grade '0' covering exactly 0".into()));
        }
        Ok(())
    }
}

/// A named grading standard for one essay prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rubric {
    pub title: String,
    pub description: String,
    pub total: u32,
    pub parts: Vec<Part>,
}

impl Rubric {
    /// Checks every rubric invariant, returning the first violation.
    pub fn validate(&self) -> Result<(), RubricError> {
        if self.title.trim().is_empty() {
            return Err(RubricError::config(&self.title, "title must not be empty"));
        }
        if self.parts.is_empty() {
            return Err(RubricError::config(&self.title, "rubric has no parts"));
        }
        for part in &self.parts {
            part.validate(&self.title)?;
        }
        let weights = self
            .parts
            .iter()
            .try_fold(0u32, |sum, p| sum.checked_add(p.weight))
            .ok_or_else(|| RubricError::config(&self.title, "part weights overflow"))?;
        if weights != self.total {
            return Err(RubricError::config(
                &self.title,
                format!("part weights sum to {weights} but total is {}", self.total),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn band(grade: Grade, range: &str) -> GradeBand {
        GradeBand::new(grade, range, format!("{grade} 描述")).unwrap()
    }

    /// The two-part rubric used across the crate's tests (4 + 21 points).
    pub(crate) fn sample_rubric() -> Rubric {
        Rubric {
            title: "X".into(),
            description: String::new(),
            total: 25,
            parts: vec![
                Part {
                    title: "第一小題".into(),
                    weight: 4,
                    bands: vec![
                        band(Grade::A, "4-3"),
                        band(Grade::B, "2"),
                        band(Grade::C, "1"),
                        band(Grade::Zero, "0"),
                    ],
                },
                Part {
                    title: "第二小題".into(),
                    weight: 21,
                    bands: vec![
                        band(Grade::APlus, "21-19"),
                        band(Grade::A, "18-15"),
                        band(Grade::BPlus, "14-12"),
                        band(Grade::B, "11-8"),
                        band(Grade::CPlus, "7-5"),
                        band(Grade::C, "4-1"),
                        band(Grade::Zero, "0"),
                    ],
                },
            ],
        }
    }

    #[test]
    fn grade_order_is_quality_not_alphabetic() {
        assert!(Grade::APlus > Grade::A);
        assert!(Grade::BPlus > Grade::B);
        assert!(Grade::C > Grade::Zero);
        assert!(Grade::CPlus < Grade::B);
    }

    #[test]
    fn grade_labels_parse() {
        assert_eq!("A+".parse::<Grade>().unwrap(), Grade::APlus);
        assert_eq!(" 0 ".parse::<Grade>().unwrap(), Grade::Zero);
        assert!("D".parse::<Grade>().is_err());
        assert!("a".parse::<Grade>().is_err());
    }

    #[test]
    fn score_range_accepts_either_order() {
        assert_eq!("21-19".parse::<ScoreRange>().unwrap(), ScoreRange::new(19, 21));
        assert_eq!("22-25".parse::<ScoreRange>().unwrap(), ScoreRange::new(22, 25));
        assert_eq!("2".parse::<ScoreRange>().unwrap(), ScoreRange::single(2));
        assert!("2-".parse::<ScoreRange>().is_err());
        assert!("x".parse::<ScoreRange>().is_err());
    }

    #[test]
    fn score_range_renders_high_first() {
        assert_eq!(ScoreRange::new(22, 25).to_string(), "25-22");
        assert_eq!(ScoreRange::single(0).to_string(), "0");
    }

    #[test]
    fn sample_rubric_is_valid() {
        sample_rubric().validate().unwrap();
    }

    #[test]
    fn band_lookup_by_grade() {
        let rubric = sample_rubric();
        let part = &rubric.parts[1];
        assert_eq!(part.band(Grade::BPlus).unwrap().range, ScoreRange::new(12, 14));
        assert!(part.band(Grade::A).unwrap().range.contains(17));
        assert!(rubric.parts[0].band(Grade::APlus).is_none());
    }

    #[test]
    fn band_keeps_declared_range_text() {
        let band = GradeBand::new(Grade::APlus, " 22-25 ", "佳").unwrap();
        assert_eq!(band.range, ScoreRange::new(22, 25));
        assert_eq!(band.range_label, "22-25");
        assert!(GradeBand::new(Grade::A, "滿分", "佳").is_err());
    }

    #[test]
    fn overflowing_range_is_a_configuration_error() {
        let mut rubric = sample_rubric();
        rubric.parts[1].bands[5].range = ScoreRange::new(1, u32::MAX);
        let err = rubric.validate().unwrap_err();
        assert!(err.to_string().contains("gap or overlap"));
    }

    #[test]
    fn overflowing_weights_are_a_configuration_error() {
        let mut rubric = sample_rubric();
        rubric.parts[0].weight = u32::MAX;
        rubric.parts[0].bands[0].range = ScoreRange::new(3, u32::MAX);
        let err = rubric.validate().unwrap_err();
        assert!(matches!(err, RubricError::Configuration { .. }));
        assert!(err.to_string().contains("part weights overflow"));
    }

    #[test]
    fn rejects_weight_total_mismatch() {
        let mut rubric = sample_rubric();
        rubric.total = 30;
        let err = rubric.validate().unwrap_err();
        assert!(matches!(err, RubricError::Configuration { .. }));
        assert!(err.to_string().contains("sum to 25"));
    }

    #[test]
    fn rejects_gap_between_bands() {
        let mut rubric = sample_rubric();
        rubric.parts[1].bands[1].range = ScoreRange::new(15, 17);
        assert!(rubric.validate().unwrap_err().to_string().contains("gap or overlap"));
    }

    #[test]
    fn rejects_overlapping_bands() {
        let mut rubric = sample_rubric();
        rubric.parts[0].bands[1].range = ScoreRange::new(2, 3);
        assert!(rubric.validate().is_err());
    }

    #[test]
    fn rejects_missing_zero_band() {
        let mut rubric = sample_rubric();
        rubric.parts[0].bands.pop();
        rubric.parts[0].bands[2].range = ScoreRange::new(0, 1);
        assert!(rubric.validate().unwrap_err().to_string().contains("grade '0'"));
    }

    #[test]
    fn rejects_bands_out_of_order() {
        let mut rubric = sample_rubric();
        rubric.parts[0].bands.swap(1, 2);
        assert!(rubric.validate().is_err());
    }

    #[test]
    fn rejects_top_band_not_reaching_weight() {
        let mut rubric = sample_rubric();
        rubric.parts[0].weight = 5;
        rubric.total = 26;
        assert!(rubric.validate().unwrap_err().to_string().contains("tops out at 4"));
    }
}
