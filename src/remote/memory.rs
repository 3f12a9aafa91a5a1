use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ActiveTemplate, CloudUserData, NewTemplate, Template, TemplateInfo, UserSettings};

use super::RemoteStore;

/// Process-local document store. Used when no remote endpoint is
/// configured and in tests, where `set_offline` simulates an outage.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    users: Mutex<HashMap<String, CloudUserData>>,
    templates: Mutex<HashMap<String, Template>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful writes to user documents.
    pub fn user_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn user_document(&self, uid: &str) -> Option<CloudUserData> {
        self.users().get(uid).cloned()
    }

    pub fn put_user_document(&self, uid: &str, data: CloudUserData) {
        self.users().insert(uid.to_string(), data);
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Remote("remote store is offline".to_string()));
        }
        Ok(())
    }

    fn users(&self) -> std::sync::MutexGuard<'_, HashMap<String, CloudUserData>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn templates(&self) -> std::sync::MutexGuard<'_, HashMap<String, Template>> {
        self.templates.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn list_templates(&self, approved: bool) -> Vec<Template> {
        let mut found: Vec<Template> = self
            .templates()
            .values()
            .filter(|t| t.is_approved == approved)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn load_user_data(&self, uid: &str) -> Result<Option<CloudUserData>, AppError> {
        self.check_online()?;
        Ok(self.users().get(uid).cloned())
    }

    async fn save_user_data(&self, uid: &str, data: &CloudUserData) -> Result<(), AppError> {
        self.check_online()?;
        self.users().insert(uid.to_string(), data.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_active_template(&self, uid: &str, active: &ActiveTemplate) -> Result<(), AppError> {
        self.check_online()?;
        let mut users = self.users();
        let doc = users.entry(uid.to_string()).or_insert_with(|| CloudUserData {
            active_template: active.clone(),
            settings: UserSettings::default(),
            last_updated: None,
        });
        doc.active_template = active.clone();
        doc.last_updated = Some(Utc::now());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_settings(&self, uid: &str, settings: &UserSettings) -> Result<(), AppError> {
        self.check_online()?;
        let mut users = self.users();
        let doc = users.entry(uid.to_string()).or_insert_with(|| CloudUserData {
            active_template: ActiveTemplate::new(&[], &TemplateInfo::default()),
            settings: UserSettings::default(),
            last_updated: None,
        });
        doc.settings = *settings;
        doc.last_updated = Some(Utc::now());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_template(&self, template: &NewTemplate) -> Result<String, AppError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        self.templates()
            .insert(id.clone(), template.clone().into_template(id.clone()));
        Ok(id)
    }

    async fn fetch_templates(&self, approved: bool) -> Result<Vec<Template>, AppError> {
        self.check_online()?;
        Ok(self.list_templates(approved))
    }

    async fn approve_template(&self, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        let mut templates = self.templates();
        let template = templates.get_mut(id).ok_or(AppError::NotFound)?;
        template.is_approved = true;
        Ok(())
    }

    async fn delete_template(&self, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        self.templates().remove(id).map(|_| ()).ok_or(AppError::NotFound)
    }
}
