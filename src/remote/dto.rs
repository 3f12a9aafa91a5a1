use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActiveTemplate, UserSettings};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTemplatePatch<'a> {
    pub active_template: &'a ActiveTemplate,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch<'a> {
    pub settings: &'a UserSettings,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPatch {
    pub is_approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatedDocument {
    pub id: String,
}
