use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::Semester;
use super::template::TemplateInfo;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub dark_mode: bool,
    pub persistent_login: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTemplate {
    #[serde(default)]
    pub semesters: Vec<Semester>,
    pub name: String,
    pub is_default: bool,
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl ActiveTemplate {
    pub fn new(semesters: &[Semester], info: &TemplateInfo) -> Self {
        Self {
            semesters: semesters.to_vec(),
            name: info.name.clone(),
            is_default: info.is_default,
            is_custom: info.is_custom,
            template_id: info.template_id.clone(),
        }
    }

    pub fn template_info(&self) -> TemplateInfo {
        TemplateInfo {
            name: self.name.clone(),
            is_default: self.is_default,
            is_custom: self.is_custom,
            template_id: self.template_id.clone(),
        }
    }
}

/// The per-user remote document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudUserData {
    pub active_template: ActiveTemplate,
    #[serde(default)]
    pub settings: UserSettings,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Identity handed over by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl UserIdentity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
            email_verified: true,
        }
    }
}
