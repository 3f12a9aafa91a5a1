//! Input checks run before any state is touched.

use crate::error::AppError;
use crate::grades::is_known_grade;
use crate::models::Semester;

const TEMPLATE_NAME_MIN: usize = 3;
const TEMPLATE_NAME_MAX: usize = 50;
const TEMPLATE_DESCRIPTION_MIN: usize = 10;
const TEMPLATE_DESCRIPTION_MAX: usize = 500;

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

pub fn validate_semester_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(invalid("Please enter a semester name"));
    }
    Ok(())
}

pub fn validate_course_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(invalid("Please enter a course name"));
    }
    Ok(())
}

/// Parses the credits field. Must be a finite number above zero.
pub fn parse_course_credits(raw: &str) -> Result<f64, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(invalid("Please enter the number of credits"));
    }
    let credits: f64 = raw
        .parse()
        .map_err(|_| invalid("Credits must be a number"))?;
    if !credits.is_finite() {
        return Err(invalid("Credits must be a number"));
    }
    if credits <= 0.0 {
        return Err(invalid("Credits must be greater than zero"));
    }
    Ok(credits)
}

pub fn validate_grade(grade: &str) -> Result<(), AppError> {
    if grade.is_empty() || is_known_grade(grade) {
        Ok(())
    } else {
        Err(invalid(format!("Unknown grade: {}", grade)))
    }
}

pub fn validate_template_name(name: &str) -> Result<(), AppError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(invalid("Template name is required"));
    }
    if len < TEMPLATE_NAME_MIN {
        return Err(invalid("Template name must be at least 3 characters long"));
    }
    if len > TEMPLATE_NAME_MAX {
        return Err(invalid("Template name must be less than 50 characters"));
    }
    Ok(())
}

pub fn validate_template_description(description: &str) -> Result<(), AppError> {
    let len = description.trim().chars().count();
    if len == 0 {
        return Err(invalid("Template description is required"));
    }
    if len < TEMPLATE_DESCRIPTION_MIN {
        return Err(invalid("Template description must be at least 10 characters long"));
    }
    if len > TEMPLATE_DESCRIPTION_MAX {
        return Err(invalid("Template description must be less than 500 characters"));
    }
    Ok(())
}

/// A shareable template needs semesters, and none of them empty.
pub fn validate_template_semesters(semesters: &[Semester]) -> Result<(), AppError> {
    if semesters.is_empty() {
        return Err(invalid("Please add at least one semester before submitting the template"));
    }
    if semesters.iter().all(|s| s.courses.is_empty()) {
        return Err(invalid(
            "Please add some courses to at least one semester before submitting the template",
        ));
    }
    let empty = semesters.iter().filter(|s| s.courses.is_empty()).count();
    if empty > 0 {
        return Err(invalid(format!(
            "{} semester(s) have no courses. Please add courses or remove empty semesters.",
            empty
        )));
    }
    Ok(())
}
