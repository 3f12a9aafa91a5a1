use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::AppError;
use crate::models::{Course, NewTemplate, Semester, Template, TemplateStructure, UserIdentity};
use crate::remote::RemoteStore;
use crate::validation::{validate_template_description, validate_template_name, validate_template_semesters};

/// Community templates: anyone signed in submits, the admin reviews.
#[derive(Clone)]
pub struct TemplateService {
    remote: Arc<dyn RemoteStore>,
    admin_uid: Option<String>,
}

impl TemplateService {
    pub fn new(remote: Arc<dyn RemoteStore>, admin_uid: Option<String>) -> Self {
        Self { remote, admin_uid }
    }

    pub fn is_admin(&self, user: &UserIdentity) -> bool {
        self.admin_uid.as_deref() == Some(user.uid.as_str())
    }

    fn require_admin(&self, user: &UserIdentity) -> Result<(), AppError> {
        if self.is_admin(user) {
            Ok(())
        } else {
            Err(AppError::Forbidden("You don't have admin privileges".to_string()))
        }
    }

    /// Stores the semesters as a pending template, grades stripped.
    pub async fn submit(
        &self,
        user: &UserIdentity,
        name: &str,
        description: &str,
        semesters: &[Semester],
    ) -> Result<String, AppError> {
        validate_template_name(name)?;
        validate_template_description(description)?;
        let email = user
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::Validation("You must be logged in to submit a template".to_string()))?;
        validate_template_semesters(semesters)?;

        let template = NewTemplate {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            structure: TemplateStructure {
                semesters: semesters.iter().map(without_grades).collect(),
            },
            created_by: created_by(email),
            is_approved: false,
            created_at: Utc::now(),
        };

        info!("Submitting template: {} by {}", template.name, template.created_by);
        let id = self.remote.create_template(&template).await?;
        info!("Template submitted: {}", id);
        Ok(id)
    }

    pub async fn approved(&self) -> Result<Vec<Template>, AppError> {
        self.remote.fetch_templates(true).await
    }

    pub async fn find_approved(&self, id: &str) -> Result<Template, AppError> {
        self.approved()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(AppError::NotFound)
    }

    pub async fn pending(&self, user: &UserIdentity) -> Result<Vec<Template>, AppError> {
        self.require_admin(user)?;
        self.remote.fetch_templates(false).await
    }

    pub async fn approve(&self, user: &UserIdentity, id: &str) -> Result<(), AppError> {
        self.require_admin(user)?;
        self.remote.approve_template(id).await?;
        info!("Template approved: {}", id);
        Ok(())
    }

    /// Rejection deletes the template outright.
    pub async fn reject(&self, user: &UserIdentity, id: &str) -> Result<(), AppError> {
        self.require_admin(user)?;
        self.remote.delete_template(id).await?;
        info!("Template rejected: {}", id);
        Ok(())
    }
}

fn without_grades(semester: &Semester) -> Semester {
    Semester {
        name: semester.name.clone(),
        courses: semester
            .courses
            .iter()
            .map(|c| Course::new(c.name.clone(), c.credits))
            .collect(),
    }
}

/// Username part of the submitter's email.
fn created_by(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}
