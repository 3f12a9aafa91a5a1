//! Device-local persistence, namespaced per user.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{Semester, TemplateInfo, UserSettings};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// String-keyed store holding JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub fn semesters_key(uid: &str) -> String {
    format!("semesters_{}", uid)
}

pub fn template_info_key(uid: &str) -> String {
    format!("templateInfo_{}", uid)
}

pub fn has_launched_key(uid: &str) -> String {
    format!("hasLaunched_{}", uid)
}

pub fn settings_key(uid: &str) -> String {
    format!("settings_{}", uid)
}

pub fn last_synced_key(uid: &str) -> String {
    format!("lastSynced_{}", uid)
}

/// Typed access to the key-value store. Every call takes the user id
/// explicitly so one user's data is never read under another identity.
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Missing, unreadable and undecodable values all come back as `None`.
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable value at {}: {}", key, e);
                None
            }
        }
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw).await
    }

    pub async fn load_semesters(&self, uid: Option<&str>) -> Vec<Semester> {
        let Some(uid) = uid else {
            return Vec::new();
        };
        self.get_json(&semesters_key(uid)).await.unwrap_or_default()
    }

    /// Without a user this does nothing.
    pub async fn save_semesters(&self, uid: Option<&str>, semesters: &[Semester]) -> Result<(), AppError> {
        let Some(uid) = uid else {
            debug!("No signed-in user, skipping local save");
            return Ok(());
        };
        self.set_json(&semesters_key(uid), semesters).await
    }

    pub async fn load_template_info(&self, uid: &str) -> Option<TemplateInfo> {
        self.get_json(&template_info_key(uid)).await
    }

    pub async fn save_template_info(&self, uid: &str, info: &TemplateInfo) -> Result<(), AppError> {
        self.set_json(&template_info_key(uid), info).await
    }

    pub async fn load_settings(&self, uid: &str) -> UserSettings {
        self.get_json(&settings_key(uid)).await.unwrap_or_default()
    }

    pub async fn save_settings(&self, uid: &str, settings: &UserSettings) -> Result<(), AppError> {
        self.set_json(&settings_key(uid), settings).await
    }

    pub async fn has_launched(&self, uid: &str) -> bool {
        match self.kv.get(&has_launched_key(uid)).await {
            Ok(value) => value.is_some(),
            Err(e) => {
                warn!("Failed to read first-launch flag: {}", e);
                false
            }
        }
    }

    pub async fn mark_launched(&self, uid: &str) -> Result<(), AppError> {
        self.kv.set(&has_launched_key(uid), "true").await
    }

    pub async fn last_synced(&self, uid: &str) -> Option<DateTime<Utc>> {
        self.get_json(&last_synced_key(uid)).await
    }

    pub async fn set_last_synced(&self, uid: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        self.set_json(&last_synced_key(uid), &at).await
    }

    /// Wipes the semester list and the first-launch flag so template
    /// selection runs again.
    pub async fn reset(&self, uid: &str) -> Result<(), AppError> {
        self.kv.remove(&semesters_key(uid)).await?;
        self.kv.remove(&has_launched_key(uid)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;

    fn store() -> (Arc<MemoryStore>, LocalStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), LocalStore::new(kv))
    }

    fn sample() -> Vec<Semester> {
        let mut first = Semester::new("Semester 1");
        first.courses.push(Course {
            name: "Maths".to_string(),
            credits: 4.0,
            grade: "A+".to_string(),
        });
        first.courses.push(Course::new("Lab", 1.5));
        vec![first, Semester::new("Semester 2")]
    }

    #[tokio::test]
    async fn semesters_round_trip() {
        let (_, local) = store();
        local.save_semesters(Some("u1"), &sample()).await.unwrap();
        assert_eq!(local.load_semesters(Some("u1")).await, sample());
    }

    #[tokio::test]
    async fn users_do_not_see_each_other() {
        let (_, local) = store();
        local.save_semesters(Some("u1"), &sample()).await.unwrap();

        assert!(local.load_semesters(Some("u2")).await.is_empty());
        local.save_semesters(Some("u2"), &[]).await.unwrap();
        assert_eq!(local.load_semesters(Some("u1")).await, sample());
    }

    #[tokio::test]
    async fn no_user_means_no_io() {
        let (kv, local) = store();
        local.save_semesters(None, &sample()).await.unwrap();
        assert!(local.load_semesters(None).await.is_empty());
        assert_eq!(kv.get("semesters_").await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_decodes_to_empty() {
        let (kv, local) = store();
        kv.set(&semesters_key("u1"), "{not json").await.unwrap();
        assert!(local.load_semesters(Some("u1")).await.is_empty());
    }

    #[tokio::test]
    async fn reset_clears_list_and_launch_flag_only() {
        let (_, local) = store();
        local.save_semesters(Some("u1"), &sample()).await.unwrap();
        local.mark_launched("u1").await.unwrap();
        local.save_settings("u1", &UserSettings { dark_mode: true, persistent_login: false }).await.unwrap();

        local.reset("u1").await.unwrap();

        assert!(local.load_semesters(Some("u1")).await.is_empty());
        assert!(!local.has_launched("u1").await);
        assert!(local.load_settings("u1").await.dark_mode);
    }
}
