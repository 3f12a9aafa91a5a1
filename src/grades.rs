//! Grade-point table shared by every GPA computation.

use serde::Serialize;

/// Label to point value, highest grade first.
pub const GRADE_POINTS: [(&str, f64); 11] = [
    ("O", 10.0),
    ("A+", 9.5),
    ("A", 9.0),
    ("B+", 8.0),
    ("B", 7.0),
    ("C", 6.0),
    ("P", 5.0),
    ("F", 0.0),
    ("W", 0.0),
    ("I", 0.0),
    ("FA", 0.0),
];

/// Grades shown up front in the grade picker.
pub const MAIN_GRADES: [&str; 5] = ["O", "A+", "A", "B+", "B"];

/// Grades tucked behind the "more" toggle.
pub const EXTRA_GRADES: [&str; 6] = ["C", "P", "F", "W", "I", "FA"];

/// Points for a grade label. Unknown labels are worth nothing.
pub fn grade_points(label: &str) -> f64 {
    GRADE_POINTS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

pub fn is_known_grade(label: &str) -> bool {
    GRADE_POINTS.iter().any(|(name, _)| *name == label)
}

#[derive(Debug, Serialize)]
pub struct GradeEntry {
    pub label: &'static str,
    pub points: f64,
}

#[derive(Debug, Serialize)]
pub struct GradeTable {
    pub grades: Vec<GradeEntry>,
    pub main: Vec<&'static str>,
    pub extra: Vec<&'static str>,
}

pub fn grade_table() -> GradeTable {
    GradeTable {
        grades: GRADE_POINTS
            .iter()
            .map(|(label, points)| GradeEntry { label: *label, points: *points })
            .collect(),
        main: MAIN_GRADES.to_vec(),
        extra: EXTRA_GRADES.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_to_points() {
        assert_eq!(grade_points("O"), 10.0);
        assert_eq!(grade_points("A+"), 9.5);
        assert_eq!(grade_points("P"), 5.0);
        assert_eq!(grade_points("FA"), 0.0);
    }

    #[test]
    fn unknown_label_is_zero() {
        assert_eq!(grade_points("Z"), 0.0);
        assert!(!is_known_grade("Z"));
        assert!(!is_known_grade(""));
    }

    #[test]
    fn main_and_extra_cover_the_table() {
        let mut all: Vec<&str> = MAIN_GRADES.iter().chain(EXTRA_GRADES.iter()).copied().collect();
        all.sort();
        let mut table: Vec<&str> = GRADE_POINTS.iter().map(|(l, _)| *l).collect();
        table.sort();
        assert_eq!(all, table);
    }
}
