pub mod course;
pub mod template;
pub mod user_data;

pub use course::{Course, CourseRequest, GradeRequest, NewSemesterRequest, Semester};
pub use template::{NewTemplate, SubmitTemplateRequest, Template, TemplateChoice, TemplateInfo, TemplateStructure};
pub use user_data::{ActiveTemplate, CloudUserData, UserIdentity, UserSettings};
