use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{ActiveTemplate, CloudUserData, Semester, TemplateInfo, UserSettings};
use crate::remote::RemoteStore;

/// Bookkeeping for the current user's remote document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_loading: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub cloud_data: Option<CloudUserData>,
    pub has_cloud_data: bool,
    pub sync_error: Option<String>,
}

#[derive(Default)]
struct SyncState {
    status: SyncStatus,
    // bumped on logout so late results from an old session are dropped
    generation: u64,
}

/// Last-write-wins: no local sync yet, or an unstamped remote document,
/// means the remote copy wins.
pub fn is_remote_newer(local: Option<DateTime<Utc>>, remote: &CloudUserData) -> bool {
    match (local, remote.last_updated) {
        (Some(local), Some(remote)) => remote > local,
        _ => true,
    }
}

/// Semesters to hydrate from a fetched document, if it carries any.
pub fn restore_from_cloud(data: &CloudUserData) -> Option<Vec<Semester>> {
    if data.active_template.semesters.is_empty() {
        return None;
    }
    Some(data.active_template.semesters.clone())
}

/// Exclusive right to write the remote document. Take it before reading the
/// state to be written, so no later snapshot can land first.
pub struct WriteGuard<'a> {
    generation: u64,
    _gate: tokio::sync::MutexGuard<'a, ()>,
}

/// Remote failures are recorded in `sync_error` and never escalate; the
/// last good snapshot stays in place. Writes are serialized through one gate.
pub struct CloudSync {
    remote: Arc<dyn RemoteStore>,
    state: Mutex<SyncState>,
    write_gate: tokio::sync::Mutex<()>,
}

impl CloudSync {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            state: Mutex::new(SyncState::default()),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Applies `update` only if no logout happened since `generation`.
    fn record(&self, generation: u64, update: impl FnOnce(&mut SyncStatus)) {
        let mut state = self.state();
        if state.generation == generation {
            update(&mut state.status);
        } else {
            debug!("Dropping sync result from an ended session");
        }
    }

    fn record_failure(&self, generation: u64, message: &str, err: &AppError) {
        warn!("{}: {}", message, err);
        self.record(generation, |status| status.sync_error = Some(message.to_string()));
    }

    pub fn status(&self) -> SyncStatus {
        self.state().status.clone()
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.state().status.last_sync_time
    }

    pub fn sync_error(&self) -> Option<String> {
        self.state().status.sync_error.clone()
    }

    pub fn clear_sync_error(&self) {
        self.state().status.sync_error = None;
    }

    /// Waits for any in-flight write to finish.
    pub async fn begin_write(&self) -> WriteGuard<'_> {
        let generation = self.generation();
        let gate = self.write_gate.lock().await;
        WriteGuard {
            generation,
            _gate: gate,
        }
    }

    pub async fn load_from_cloud(&self, uid: &str) -> Result<Option<CloudUserData>, AppError> {
        let generation = self.generation();
        self.record(generation, |status| {
            status.is_loading = true;
            status.sync_error = None;
        });

        let result = self.remote.load_user_data(uid).await;

        match &result {
            Ok(data) => {
                debug!("Loaded user document (present: {})", data.is_some());
                self.record(generation, |status| {
                    status.cloud_data = data.clone();
                    status.has_cloud_data = data.is_some();
                    if data.is_some() {
                        status.last_sync_time = Some(Utc::now());
                    }
                });
            }
            Err(e) => self.record_failure(generation, "Failed to load data from cloud", e),
        }
        self.record(generation, |status| status.is_loading = false);

        result
    }

    pub async fn save_to_cloud(
        &self,
        write: &WriteGuard<'_>,
        uid: &str,
        semesters: &[Semester],
        info: &TemplateInfo,
        settings: &UserSettings,
    ) -> Result<(), AppError> {
        let generation = write.generation;
        self.record(generation, |status| status.sync_error = None);

        let now = Utc::now();
        let document = CloudUserData {
            active_template: ActiveTemplate::new(semesters, info),
            settings: *settings,
            last_updated: Some(now),
        };

        match self.remote.save_user_data(uid, &document).await {
            Ok(()) => {
                info!("Saved user document ({} semesters)", semesters.len());
                self.record(generation, |status| {
                    status.last_sync_time = Some(now);
                    status.has_cloud_data = true;
                    status.cloud_data = Some(document);
                });
                Ok(())
            }
            Err(e) => {
                self.record_failure(generation, "Failed to save data to cloud", &e);
                Err(e)
            }
        }
    }

    pub async fn update_template_in_cloud(
        &self,
        write: &WriteGuard<'_>,
        uid: &str,
        semesters: &[Semester],
        info: &TemplateInfo,
    ) -> Result<(), AppError> {
        let generation = write.generation;
        let active = ActiveTemplate::new(semesters, info);

        match self.remote.update_active_template(uid, &active).await {
            Ok(()) => {
                let now = Utc::now();
                self.record(generation, |status| {
                    status.last_sync_time = Some(now);
                    status.has_cloud_data = true;
                    if let Some(doc) = status.cloud_data.as_mut() {
                        doc.active_template = active;
                        doc.last_updated = Some(now);
                    }
                });
                Ok(())
            }
            Err(e) => {
                self.record_failure(generation, "Failed to update template in cloud", &e);
                Err(e)
            }
        }
    }

    pub async fn update_settings_in_cloud(&self, uid: &str, settings: &UserSettings) -> Result<(), AppError> {
        let write = self.begin_write().await;
        let generation = write.generation;

        match self.remote.update_settings(uid, settings).await {
            Ok(()) => {
                let now = Utc::now();
                self.record(generation, |status| {
                    status.last_sync_time = Some(now);
                    if let Some(doc) = status.cloud_data.as_mut() {
                        doc.settings = *settings;
                        doc.last_updated = Some(now);
                    }
                });
                Ok(())
            }
            Err(e) => {
                self.record_failure(generation, "Failed to update settings in cloud", &e);
                Err(e)
            }
        }
    }

    /// Forgets everything about the ended session. In-flight writes finish
    /// but their results are not recorded.
    pub fn reset(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.status = SyncStatus::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use crate::remote::MemoryRemoteStore;
    use chrono::Duration;

    fn doc_at(last_updated: Option<DateTime<Utc>>) -> CloudUserData {
        CloudUserData {
            active_template: ActiveTemplate::new(&[], &TemplateInfo::default()),
            settings: UserSettings::default(),
            last_updated,
        }
    }

    fn semesters() -> Vec<Semester> {
        let mut s = Semester::new("Semester 1");
        s.courses.push(Course::new("Maths", 4.0));
        vec![s]
    }

    async fn save(sync: &CloudSync) -> Result<(), AppError> {
        let write = sync.begin_write().await;
        sync.save_to_cloud(&write, "u1", &semesters(), &TemplateInfo::default(), &UserSettings::default())
            .await
    }

    #[test]
    fn remote_wins_without_local_sync() {
        assert!(is_remote_newer(None, &doc_at(Some(Utc::now()))));
        assert!(is_remote_newer(None, &doc_at(None)));
    }

    #[test]
    fn newer_timestamp_wins() {
        let now = Utc::now();
        assert!(is_remote_newer(Some(now), &doc_at(Some(now + Duration::seconds(5)))));
        assert!(!is_remote_newer(Some(now), &doc_at(Some(now - Duration::seconds(5)))));
        assert!(!is_remote_newer(Some(now), &doc_at(Some(now))));
    }

    #[test]
    fn empty_document_restores_nothing() {
        assert!(restore_from_cloud(&doc_at(None)).is_none());
    }

    #[tokio::test]
    async fn save_records_snapshot() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = CloudSync::new(remote.clone());

        save(&sync).await.unwrap();

        let status = sync.status();
        assert!(status.has_cloud_data);
        assert!(status.last_sync_time.is_some());
        assert_eq!(status.cloud_data.unwrap().active_template.semesters, semesters());
        assert_eq!(remote.user_document("u1").unwrap().active_template.semesters, semesters());
    }

    #[tokio::test]
    async fn failure_sets_error_and_keeps_last_good_state() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = CloudSync::new(remote.clone());
        save(&sync).await.unwrap();
        let before = sync.status();

        remote.set_offline(true);
        let write = sync.begin_write().await;
        assert!(sync.update_template_in_cloud(&write, "u1", &[], &TemplateInfo::default()).await.is_err());
        drop(write);

        let after = sync.status();
        assert_eq!(after.sync_error.as_deref(), Some("Failed to update template in cloud"));
        assert_eq!(after.last_sync_time, before.last_sync_time);
        assert_eq!(after.cloud_data, before.cloud_data);

        sync.clear_sync_error();
        assert!(sync.sync_error().is_none());
    }

    #[tokio::test]
    async fn load_failure_is_recorded() {
        let remote = Arc::new(MemoryRemoteStore::new());
        remote.set_offline(true);
        let sync = CloudSync::new(remote);

        assert!(sync.load_from_cloud("u1").await.is_err());
        let status = sync.status();
        assert_eq!(status.sync_error.as_deref(), Some("Failed to load data from cloud"));
        assert!(!status.is_loading);
    }

    #[tokio::test]
    async fn reset_clears_bookkeeping() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = CloudSync::new(remote);
        save(&sync).await.unwrap();

        sync.reset();

        let status = sync.status();
        assert!(status.cloud_data.is_none());
        assert!(status.last_sync_time.is_none());
        assert!(!status.has_cloud_data);
        assert!(status.sync_error.is_none());
    }

    #[tokio::test]
    async fn settings_failure_is_recorded() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = CloudSync::new(remote.clone());
        save(&sync).await.unwrap();

        remote.set_offline(true);
        let dark = UserSettings {
            dark_mode: true,
            persistent_login: false,
        };
        assert!(sync.update_settings_in_cloud("u1", &dark).await.is_err());

        let status = sync.status();
        assert_eq!(status.sync_error.as_deref(), Some("Failed to update settings in cloud"));
        assert!(!status.cloud_data.unwrap().settings.dark_mode);
        assert!(!remote.user_document("u1").unwrap().settings.dark_mode);
    }

    #[tokio::test]
    async fn write_from_ended_session_is_not_recorded() {
        let remote = Arc::new(MemoryRemoteStore::new());
        let sync = CloudSync::new(remote.clone());

        let write = sync.begin_write().await;
        sync.reset();
        sync.save_to_cloud(&write, "u1", &semesters(), &TemplateInfo::default(), &UserSettings::default())
            .await
            .unwrap();

        assert!(remote.user_document("u1").is_some());
        let status = sync.status();
        assert!(!status.has_cloud_data);
        assert!(status.last_sync_time.is_none());
    }
}
