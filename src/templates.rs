//! Built-in starting points offered at first launch.

use crate::models::{Course, Semester, Template, TemplateInfo};

fn semester(name: &str, courses: &[(&str, f64)]) -> Semester {
    Semester {
        name: name.to_string(),
        courses: courses
            .iter()
            .map(|(course, credits)| Course::new(*course, *credits))
            .collect(),
    }
}

pub fn default_semesters() -> Vec<Semester> {
    vec![
        semester(
            "Semester 1",
            &[
                ("Foundations of Indian Heritage", 2.0),
                ("Mastery Over Mind", 2.0),
                ("Nature Inspired Engineering", 3.0),
                ("Problem Solving and Algorithmic Thinking", 2.0),
                ("Fundamentals of Electrical Engineering", 3.0),
                ("Physics of Semiconductors", 3.0),
                ("Electrical Engineering Laboratory", 1.0),
                ("Technical Communication", 3.0),
                ("Engineering Mathematics I", 4.0),
            ],
        ),
        semester(
            "Semester 2",
            &[
                ("Glimpses of Glorious India", 2.0),
                ("Engineering Chemistry - B", 3.0),
                ("Computer Hardware and System Essentials", 3.0),
                ("Digital Electronics", 3.0),
                ("Computer Hardware and System Essentials Laboratory", 1.0),
                ("Digital Electronics Laboratory", 1.0),
                ("Computer Programming", 3.0),
                ("Network Analysis", 3.0),
                ("Computer Programming Laboratory", 1.0),
                ("Introduction to Internet of Things", 1.0),
                ("Engineering Mathematics II", 4.0),
            ],
        ),
    ]
}

pub fn empty_template() -> Vec<Semester> {
    vec![Semester::new("Semester 1")]
}

pub fn default_template_info() -> TemplateInfo {
    TemplateInfo::default()
}

pub fn blank_template_info() -> TemplateInfo {
    TemplateInfo {
        name: "Blank Template".to_string(),
        is_default: false,
        is_custom: true,
        template_id: None,
    }
}

pub fn community_template_info(template: &Template) -> TemplateInfo {
    TemplateInfo {
        name: template.name.clone(),
        is_default: false,
        is_custom: false,
        template_id: Some(template.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_ungraded() {
        let semesters = default_semesters();
        assert_eq!(semesters.len(), 2);
        assert_eq!(semesters[0].courses.iter().map(|c| c.credits).sum::<f64>(), 23.0);
        assert!(semesters.iter().flat_map(|s| &s.courses).all(|c| c.grade.is_empty()));
    }

    #[test]
    fn blank_template_has_one_empty_semester() {
        let semesters = empty_template();
        assert_eq!(semesters.len(), 1);
        assert!(semesters[0].courses.is_empty());
    }
}
