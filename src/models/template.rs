use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::Semester;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStructure {
    pub semesters: Vec<Semester>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub structure: TemplateStructure,
    pub created_by: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// A template as submitted, before the document store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub structure: TemplateStructure,
    pub created_by: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl NewTemplate {
    pub fn into_template(self, id: String) -> Template {
        Template {
            id,
            name: self.name,
            description: self.description,
            structure: self.structure,
            created_by: self.created_by,
            is_approved: self.is_approved,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTemplateRequest {
    pub name: String,
    pub description: String,
}

/// Which template the active semester list was started from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub name: String,
    pub is_default: bool,
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl Default for TemplateInfo {
    fn default() -> Self {
        Self {
            name: "Default Template".to_string(),
            is_default: true,
            is_custom: false,
            template_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "templateId", rename_all = "camelCase")]
pub enum TemplateChoice {
    Default,
    Blank,
    Community(String),
}
