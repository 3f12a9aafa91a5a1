use std::time::Duration;

use crate::grades::grade_points;
use crate::models::Semester;

/// Total animation time for a displayed GPA change.
pub const ANIMATION_DURATION: Duration = Duration::from_millis(500);
pub const ANIMATION_STEPS: u32 = 10;

/// Semester GPA as a two-digit decimal string.
pub fn calculate_gpa(semester: &Semester) -> String {
    format_gpa(weighted_totals(std::slice::from_ref(semester)))
}

/// Flat credit-weighted average across every course of every semester.
pub fn calculate_cumulative_gpa(semesters: &[Semester]) -> String {
    format_gpa(weighted_totals(semesters))
}

fn weighted_totals(semesters: &[Semester]) -> (f64, f64) {
    semesters
        .iter()
        .flat_map(|s| s.courses.iter())
        .filter(|c| c.is_graded())
        .fold((0.0, 0.0), |(sum, credits), c| {
            (sum + grade_points(&c.grade) * c.credits, credits + c.credits)
        })
}

/// Two decimals, ties rounded away from zero (`9.125` shows as `9.13`).
fn format_gpa((weighted_sum, total_credits): (f64, f64)) -> String {
    if total_credits > 0.0 {
        let gpa = weighted_sum / total_credits;
        format!("{:.2}", (gpa * 100.0).round() / 100.0)
    } else {
        "0.00".to_string()
    }
}

fn parse_gpa(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTransition {
    Jump,
    Animate,
}

/// Fresh displays and large swings jump, small changes animate.
pub fn display_transition(displayed: &str, next: &str) -> DisplayTransition {
    if displayed == "0.00" || (parse_gpa(displayed) - parse_gpa(next)).abs() > 1.0 {
        DisplayTransition::Jump
    } else {
        DisplayTransition::Animate
    }
}

/// Walks the displayed value from `start` to `end`, ending exactly on `end`.
///
/// Drop the future to cancel.
pub async fn animate_gpa_value<F>(start: &str, end: &str, mut setter: F)
where
    F: FnMut(String),
{
    let from = parse_gpa(start);
    let step_value = (parse_gpa(end) - from) / ANIMATION_STEPS as f64;

    let mut ticker = tokio::time::interval(ANIMATION_DURATION / ANIMATION_STEPS);
    // first tick completes immediately
    ticker.tick().await;

    for step in 1..=ANIMATION_STEPS {
        ticker.tick().await;
        setter(format!("{:.2}", from + step_value * step as f64));
    }

    ticker.tick().await;
    setter(end.to_string());
}
