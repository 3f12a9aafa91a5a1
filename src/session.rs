//! The signed-in user's in-memory workspace.

use crate::error::AppError;
use crate::models::{Course, Semester, TemplateInfo, UserIdentity, UserSettings};
use crate::validation::{parse_course_credits, validate_course_name, validate_grade, validate_semester_name};

#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserIdentity,
    pub semesters: Vec<Semester>,
    pub current_semester: usize,
    /// True until a template is picked; nothing is auto-saved meanwhile.
    pub is_first_launch: bool,
    pub template_info: TemplateInfo,
    pub settings: UserSettings,
}

impl Session {
    pub fn new(user: UserIdentity) -> Self {
        Self {
            user,
            semesters: Vec::new(),
            current_semester: 0,
            is_first_launch: true,
            template_info: TemplateInfo::default(),
            settings: UserSettings::default(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.user.uid
    }

    pub fn should_autosave(&self) -> bool {
        !self.is_first_launch
    }

    fn semester_mut(&mut self, index: usize) -> Result<&mut Semester, AppError> {
        self.semesters.get_mut(index).ok_or(AppError::NotFound)
    }

    fn course_mut(&mut self, semester: usize, course: usize) -> Result<&mut Course, AppError> {
        self.semester_mut(semester)?
            .courses
            .get_mut(course)
            .ok_or(AppError::NotFound)
    }

    /// Replaces the whole list with a freshly chosen template.
    pub fn apply_template(&mut self, semesters: Vec<Semester>, info: TemplateInfo) {
        self.semesters = semesters;
        self.template_info = info;
        self.current_semester = 0;
        self.is_first_launch = false;
    }

    pub fn select_semester(&mut self, index: usize) -> Result<(), AppError> {
        if index >= self.semesters.len() {
            return Err(AppError::NotFound);
        }
        self.current_semester = index;
        Ok(())
    }

    /// Appends a semester and makes it the selected one.
    pub fn add_semester(&mut self, name: &str) -> Result<(), AppError> {
        validate_semester_name(name)?;
        self.semesters.push(Semester::new(name));
        self.current_semester = self.semesters.len() - 1;
        Ok(())
    }

    pub fn rename_semester(&mut self, index: usize, name: &str) -> Result<(), AppError> {
        validate_semester_name(name)?;
        self.semester_mut(index)?.name = name.to_string();
        Ok(())
    }

    /// The last remaining semester cannot be deleted.
    pub fn delete_semester(&mut self, index: usize) -> Result<Semester, AppError> {
        if index >= self.semesters.len() {
            return Err(AppError::NotFound);
        }
        if self.semesters.len() == 1 {
            return Err(AppError::Validation("You must keep at least one semester".to_string()));
        }
        let removed = self.semesters.remove(index);
        if self.current_semester >= self.semesters.len() {
            self.current_semester = self.semesters.len().saturating_sub(1);
        }
        Ok(removed)
    }

    pub fn add_course(&mut self, semester: usize, name: &str, credits: &str) -> Result<(), AppError> {
        validate_course_name(name)?;
        let credits = parse_course_credits(credits)?;
        self.semester_mut(semester)?.courses.push(Course::new(name, credits));
        Ok(())
    }

    /// Editing a course replaces it, so its grade starts over.
    pub fn edit_course(&mut self, semester: usize, course: usize, name: &str, credits: &str) -> Result<(), AppError> {
        validate_course_name(name)?;
        let credits = parse_course_credits(credits)?;
        *self.course_mut(semester, course)? = Course::new(name, credits);
        Ok(())
    }

    pub fn delete_course(&mut self, semester: usize, course: usize) -> Result<Course, AppError> {
        let courses = &mut self.semester_mut(semester)?.courses;
        if course >= courses.len() {
            return Err(AppError::NotFound);
        }
        Ok(courses.remove(course))
    }

    pub fn set_grade(&mut self, semester: usize, course: usize, grade: &str) -> Result<(), AppError> {
        validate_grade(grade)?;
        self.course_mut(semester, course)?.grade = grade.to_string();
        Ok(())
    }

    /// Back to the template picker with nothing loaded.
    pub fn reset(&mut self) {
        self.semesters.clear();
        self.current_semester = 0;
        self.is_first_launch = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut s = Session::new(UserIdentity::new("u1", "student@example.com"));
        s.apply_template(vec![Semester::new("Semester 1")], TemplateInfo::default());
        s
    }

    #[test]
    fn new_session_waits_for_template() {
        let s = Session::new(UserIdentity::new("u1", "student@example.com"));
        assert!(s.is_first_launch);
        assert!(!s.should_autosave());
        assert!(s.semesters.is_empty());
    }

    #[test]
    fn adding_a_semester_selects_it() {
        let mut s = session();
        s.add_semester("Semester 2").unwrap();
        assert_eq!(s.current_semester, 1);
        assert!(s.add_semester("  ").is_err());
        assert_eq!(s.semesters.len(), 2);
    }

    #[test]
    fn deleting_selected_tail_clamps_selection() {
        let mut s = session();
        s.add_semester("Semester 2").unwrap();
        s.add_semester("Semester 3").unwrap();
        assert_eq!(s.current_semester, 2);
        s.delete_semester(2).unwrap();
        assert_eq!(s.current_semester, 1);
        s.delete_semester(0).unwrap();
        assert_eq!(s.current_semester, 0);
        assert_eq!(s.semesters[0].name, "Semester 2");
        assert!(matches!(s.delete_semester(5), Err(AppError::NotFound)));
    }

    #[test]
    fn last_semester_is_kept() {
        let mut s = session();
        assert!(matches!(s.delete_semester(0), Err(AppError::Validation(_))));
        assert_eq!(s.semesters.len(), 1);
        assert!(!s.is_first_launch);
    }

    #[test]
    fn invalid_course_leaves_state_untouched() {
        let mut s = session();
        assert!(s.add_course(0, "Maths", "zero").is_err());
        assert!(s.add_course(0, "Maths", "-1").is_err());
        assert!(s.add_course(0, "", "3").is_err());
        assert!(s.semesters[0].courses.is_empty());

        s.add_course(0, "Maths", "4").unwrap();
        assert_eq!(s.semesters[0].courses[0].credits, 4.0);
    }

    #[test]
    fn editing_a_course_clears_its_grade() {
        let mut s = session();
        s.add_course(0, "Maths", "4").unwrap();
        s.set_grade(0, 0, "O").unwrap();
        s.edit_course(0, 0, "Maths II", "3").unwrap();

        let course = &s.semesters[0].courses[0];
        assert_eq!(course.name, "Maths II");
        assert_eq!(course.credits, 3.0);
        assert!(course.grade.is_empty());
    }

    #[test]
    fn grades_are_checked() {
        let mut s = session();
        s.add_course(0, "Maths", "4").unwrap();
        assert!(s.set_grade(0, 0, "Z").is_err());
        assert!(s.set_grade(0, 3, "O").is_err());
        s.set_grade(0, 0, "B+").unwrap();
        s.set_grade(0, 0, "").unwrap();
        assert!(!s.semesters[0].courses[0].is_graded());
    }

    #[test]
    fn reset_returns_to_first_launch() {
        let mut s = session();
        s.reset();
        assert!(s.is_first_launch);
        assert!(s.semesters.is_empty());
    }
}
