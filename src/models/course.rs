use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub credits: f64,
    /// Grade label, empty while the course is ungraded.
    #[serde(default)]
    pub grade: String,
}

impl Course {
    pub fn new(name: impl Into<String>, credits: f64) -> Self {
        Self {
            name: name.into(),
            credits,
            grade: String::new(),
        }
    }

    pub fn is_graded(&self) -> bool {
        !self.grade.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub name: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl Semester {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            courses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSemesterRequest {
    pub name: String,
}

/// Credits arrive as raw text from the input field and are validated server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRequest {
    pub name: String,
    pub credits: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    #[serde(default)]
    pub grade: String,
}
