//! # Scorer Module
//!
//! Arithmetic over graded parts: recomputing a total from part scores and mapping a total
//! onto the display grade shown next to it in score history.

use crate::rubric::Grade;
use crate::types::PartScore;

/// Minimum totals for each display grade on the 25-point exam scale, best grade first.
const THRESHOLDS_OUT_OF_25: [(u32, Grade); 6] = [
    (22, Grade::APlus),
    (18, Grade::A),
    (14, Grade::BPlus),
    (10, Grade::B),
    (6, Grade::CPlus),
    (1, Grade::C),
];

/// Sum of the part scores.
///
/// # Example
///
/// ```
/// use marker::rubric::Grade;
/// use marker::scorer::computed_total;
/// use marker::types::PartScore;
///
/// let parts = vec![
///     PartScore { part: "第一小題".into(), grade: Grade::A, score: 3, reason: String::new() },
///     PartScore { part: "第二小題".into(), grade: Grade::A, score: 17, reason: String::new() },
/// ];
/// assert_eq!(computed_total(&parts), 20);
/// ```
pub fn computed_total(parts: &[PartScore]) -> u32 {
    parts.iter().map(|p| p.score).sum()
}

/// Maps a total onto a display grade.
///
/// On a 25-point scale: A+ from 22, A from 18, B+ from 14, B from 10, C+ from 6, C from 1,
/// otherwise `0`. Other scales stretch those cut-offs proportionally, rounding up, so on
/// small scales neighbouring cut-offs can coincide and the better grade wins.
pub fn overall_grade(total: u32, out_of: u32) -> Grade {
    if out_of == 0 {
        return Grade::Zero;
    }
    THRESHOLDS_OUT_OF_25
        .iter()
        .find(|(cutoff, _)| total >= (cutoff * out_of).div_ceil(25))
        .map(|&(_, grade)| grade)
        .unwrap_or(Grade::Zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(score: u32) -> PartScore {
        PartScore {
            part: "p".into(),
            grade: Grade::C,
            score,
            reason: String::new(),
        }
    }

    #[test]
    fn computed_total_sums_parts() {
        assert_eq!(computed_total(&[part(3), part(17)]), 20);
        assert_eq!(computed_total(&[]), 0);
    }

    #[test]
    fn overall_grade_on_exam_scale() {
        assert_eq!(overall_grade(25, 25), Grade::APlus);
        assert_eq!(overall_grade(22, 25), Grade::APlus);
        assert_eq!(overall_grade(21, 25), Grade::A);
        assert_eq!(overall_grade(14, 25), Grade::BPlus);
        assert_eq!(overall_grade(10, 25), Grade::B);
        assert_eq!(overall_grade(6, 25), Grade::CPlus);
        assert_eq!(overall_grade(1, 25), Grade::C);
        assert_eq!(overall_grade(0, 25), Grade::Zero);
    }

    #[test]
    fn overall_grade_scales_cutoffs() {
        assert_eq!(overall_grade(44, 50), Grade::APlus);
        assert_eq!(overall_grade(43, 50), Grade::A);
    }

    #[test]
    fn overall_grade_on_four_point_part() {
        // C+ (6) and C (1) both scale to 1, B+ and A both to 3; the better grade wins.
        assert_eq!(overall_grade(4, 4), Grade::APlus);
        assert_eq!(overall_grade(3, 4), Grade::A);
        assert_eq!(overall_grade(2, 4), Grade::B);
        assert_eq!(overall_grade(1, 4), Grade::CPlus);
        assert_eq!(overall_grade(0, 4), Grade::Zero);
    }

    #[test]
    fn zero_scale_is_zero_grade() {
        assert_eq!(overall_grade(0, 0), Grade::Zero);
    }
}
