use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::gpa::{calculate_cumulative_gpa, calculate_gpa};
use crate::models::{Semester, Template, TemplateChoice, TemplateInfo, UserIdentity, UserSettings};
use crate::remote::RemoteStore;
use crate::services::cloud_sync::{CloudSync, SyncStatus, WriteGuard, is_remote_newer, restore_from_cloud};
use crate::services::scheduler::{SchedulerHandle, SyncJob, SyncScheduler};
use crate::services::template_service::TemplateService;
use crate::session::Session;
use crate::storage::LocalStore;
use crate::templates;

/// Everything a client needs to render the current state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: UserIdentity,
    pub is_admin: bool,
    pub is_first_launch: bool,
    pub semesters: Vec<Semester>,
    pub current_semester: usize,
    pub semester_gpa: String,
    pub cumulative_gpa: String,
    pub template_info: TemplateInfo,
    pub settings: UserSettings,
    pub sync: SyncStatus,
}

type SharedSession = Arc<Mutex<Option<Session>>>;

/// Owns the signed-in session and keeps it mirrored locally and remotely.
pub struct Tracker {
    local: LocalStore,
    sync: Arc<CloudSync>,
    templates: TemplateService,
    session: SharedSession,
    // serializes login and logout against each other
    lifecycle: Mutex<()>,
    scheduler: std::sync::Mutex<Option<SchedulerHandle>>,
    sync_interval: Duration,
}

impl Tracker {
    pub fn new(
        local: LocalStore,
        remote: Arc<dyn RemoteStore>,
        sync_interval: Duration,
        admin_uid: Option<String>,
    ) -> Self {
        Self {
            local,
            sync: Arc::new(CloudSync::new(remote.clone())),
            templates: TemplateService::new(remote, admin_uid),
            session: Arc::new(Mutex::new(None)),
            lifecycle: Mutex::new(()),
            scheduler: std::sync::Mutex::new(None),
            sync_interval,
        }
    }

    pub fn sync(&self) -> &CloudSync {
        &self.sync
    }

    pub fn templates(&self) -> &TemplateService {
        &self.templates
    }

    fn set_scheduler(&self, handle: Option<SchedulerHandle>) {
        let mut slot = self.scheduler.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        *slot = handle;
    }

    pub fn is_syncing_periodically(&self) -> bool {
        let slot = self.scheduler.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn view_of(&self, session: &Session) -> SessionView {
        let semester_gpa = session
            .semesters
            .get(session.current_semester)
            .map(calculate_gpa)
            .unwrap_or_else(|| "0.00".to_string());

        SessionView {
            user: session.user.clone(),
            is_admin: self.templates.is_admin(&session.user),
            is_first_launch: session.is_first_launch,
            semesters: session.semesters.clone(),
            current_semester: session.current_semester,
            semester_gpa,
            cumulative_gpa: calculate_cumulative_gpa(&session.semesters),
            template_info: session.template_info.clone(),
            settings: session.settings,
            sync: self.sync.status(),
        }
    }

    /// Starts a session: hydrates from local storage, then lets the remote
    /// document win if it is newer than our last sync, otherwise pushes
    /// local state up.
    pub async fn login(&self, user: UserIdentity) -> Result<SessionView, AppError> {
        if !user.email_verified {
            return Err(AppError::Forbidden("Please verify your email address first".to_string()));
        }
        let _lifecycle = self.lifecycle.lock().await;
        self.end_session().await;

        let uid = user.uid.clone();
        info!("Starting session for {}", uid);

        let mut session = Session::new(user);
        session.settings = self.local.load_settings(&uid).await;
        if self.local.has_launched(&uid).await {
            let semesters = self.local.load_semesters(Some(&uid)).await;
            if semesters.is_empty() {
                warn!("Launched before but no semesters stored, asking for a template");
            } else {
                let info = self.local.load_template_info(&uid).await.unwrap_or_default();
                session.apply_template(semesters, info);
            }
        }

        let last_synced = self.local.last_synced(&uid).await;
        let remote = self.sync.load_from_cloud(&uid).await.ok().flatten();

        let restored = match remote {
            Some(doc) if is_remote_newer(last_synced, &doc) => match restore_from_cloud(&doc) {
                Some(semesters) => {
                    info!("Remote data is newer, restoring {} semesters", semesters.len());
                    session.apply_template(semesters, doc.active_template.template_info());
                    session.settings = doc.settings;
                    self.persist_restored(&session, doc.last_updated.unwrap_or_else(Utc::now))
                        .await;
                    true
                }
                None => false,
            },
            _ => false,
        };

        if !restored && !session.is_first_launch {
            debug!("Pushing local state for {}", uid);
            let write = self.sync.begin_write().await;
            self.push_full(&write, &session).await;
        }

        let view = self.view_of(&session);
        *self.session.lock().await = Some(session);

        let job = ActiveTemplatePush {
            uid,
            session: self.session.clone(),
            sync: self.sync.clone(),
            local: self.local.clone(),
        };
        self.set_scheduler(Some(SyncScheduler::new(Arc::new(job), self.sync_interval).spawn()));

        Ok(view)
    }

    async fn persist_restored(&self, session: &Session, synced_at: DateTime<Utc>) {
        if let Err(e) = self.store_session(session, synced_at).await {
            warn!("Failed to store restored data locally: {}", e);
        }
    }

    async fn store_session(&self, session: &Session, synced_at: DateTime<Utc>) -> Result<(), AppError> {
        let uid = session.uid();
        self.local.mark_launched(uid).await?;
        self.local.save_semesters(Some(uid), &session.semesters).await?;
        self.local.save_template_info(uid, &session.template_info).await?;
        self.local.save_settings(uid, &session.settings).await?;
        self.local.set_last_synced(uid, synced_at).await
    }

    async fn push_full(&self, write: &WriteGuard<'_>, session: &Session) {
        let uid = session.uid();
        let pushed = self
            .sync
            .save_to_cloud(write, uid, &session.semesters, &session.template_info, &session.settings)
            .await
            .is_ok();
        if pushed {
            self.remember_sync(uid).await;
        }
    }

    async fn remember_sync(&self, uid: &str) {
        if let Some(at) = self.sync.last_sync_time() {
            if let Err(e) = self.local.set_last_synced(uid, at).await {
                warn!("Failed to store sync time: {}", e);
            }
        }
    }

    /// Ends the session. Local data stays; sync bookkeeping is dropped.
    pub async fn logout(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        self.end_session().await;
    }

    async fn end_session(&self) {
        self.set_scheduler(None);
        self.sync.reset();
        if let Some(session) = self.session.lock().await.take() {
            info!("Session ended for {}", session.uid());
        }
    }

    pub async fn view(&self) -> Result<SessionView, AppError> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(AppError::Unauthorized)?;
        Ok(self.view_of(session))
    }

    pub async fn current_user(&self) -> Result<UserIdentity, AppError> {
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(AppError::Unauthorized)
    }

    /// Applies an edit and auto-saves the list, except while the template
    /// picker is still pending.
    async fn mutate<F>(&self, edit: F) -> Result<SessionView, AppError>
    where
        F: FnOnce(&mut Session) -> Result<(), AppError>,
    {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(AppError::Unauthorized)?;
        edit(session)?;

        if session.should_autosave() {
            if let Err(e) = self
                .local
                .save_semesters(Some(session.uid()), &session.semesters)
                .await
            {
                warn!("Auto-save failed: {}", e);
            }
        }

        Ok(self.view_of(session))
    }

    pub async fn add_semester(&self, name: &str) -> Result<SessionView, AppError> {
        self.mutate(|s| s.add_semester(name)).await
    }

    pub async fn rename_semester(&self, index: usize, name: &str) -> Result<SessionView, AppError> {
        self.mutate(|s| s.rename_semester(index, name)).await
    }

    pub async fn delete_semester(&self, index: usize) -> Result<SessionView, AppError> {
        self.mutate(|s| s.delete_semester(index).map(|_| ())).await
    }

    pub async fn add_course(&self, semester: usize, name: &str, credits: &str) -> Result<SessionView, AppError> {
        self.mutate(|s| s.add_course(semester, name, credits)).await
    }

    pub async fn edit_course(
        &self,
        semester: usize,
        course: usize,
        name: &str,
        credits: &str,
    ) -> Result<SessionView, AppError> {
        self.mutate(|s| s.edit_course(semester, course, name, credits)).await
    }

    pub async fn delete_course(&self, semester: usize, course: usize) -> Result<SessionView, AppError> {
        self.mutate(|s| s.delete_course(semester, course).map(|_| ())).await
    }

    pub async fn set_grade(&self, semester: usize, course: usize, grade: &str) -> Result<SessionView, AppError> {
        self.mutate(|s| s.set_grade(semester, course, grade)).await
    }

    pub async fn select_semester(&self, index: usize) -> Result<SessionView, AppError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(AppError::Unauthorized)?;
        session.select_semester(index)?;
        Ok(self.view_of(session))
    }

    /// Finishes first launch with the chosen template.
    pub async fn select_template(&self, choice: TemplateChoice) -> Result<SessionView, AppError> {
        let (semesters, info) = match &choice {
            TemplateChoice::Default => (templates::default_semesters(), templates::default_template_info()),
            TemplateChoice::Blank => (templates::empty_template(), templates::blank_template_info()),
            TemplateChoice::Community(id) => {
                let template: Template = self.templates.find_approved(id).await?;
                let info = templates::community_template_info(&template);
                (template.structure.semesters, info)
            }
        };
        if semesters.is_empty() {
            return Err(AppError::Validation("Template has no semesters".to_string()));
        }

        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(AppError::Unauthorized)?;
        let uid = session.uid().to_string();

        self.local.mark_launched(&uid).await?;
        session.apply_template(semesters, info);
        self.local.save_semesters(Some(&uid), &session.semesters).await?;
        self.local.save_template_info(&uid, &session.template_info).await?;
        info!("Template selected for {}: {}", uid, session.template_info.name);

        Ok(self.view_of(session))
    }

    /// Wipes the local list and sends the user back to template selection.
    pub async fn reset(&self) -> Result<SessionView, AppError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(AppError::Unauthorized)?;
        self.local.reset(session.uid()).await?;
        session.reset();
        info!("Local data reset for {}", session.uid());
        Ok(self.view_of(session))
    }

    /// Applies and stores settings locally, then pushes them without holding
    /// the session, so a slow remote never blocks other operations.
    pub async fn update_settings(&self, settings: UserSettings) -> Result<SessionView, AppError> {
        let uid = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or(AppError::Unauthorized)?;
            session.settings = settings;
            session.uid().to_string()
        };

        self.local.save_settings(&uid, &settings).await?;
        if self.sync.update_settings_in_cloud(&uid, &settings).await.is_ok() {
            self.remember_sync(&uid).await;
        }
        self.view().await
    }

    /// Explicit full save. Failures land in the sync status, not the result.
    pub async fn save_to_cloud(&self) -> Result<SessionView, AppError> {
        let write = self.sync.begin_write().await;
        let snapshot = {
            let guard = self.session.lock().await;
            guard.clone().ok_or(AppError::Unauthorized)?
        };
        self.push_full(&write, &snapshot).await;
        drop(write);
        self.view().await
    }

    pub async fn clear_sync_error(&self) -> Result<SessionView, AppError> {
        self.sync.clear_sync_error();
        self.view().await
    }

    pub async fn submit_template(&self, name: &str, description: &str) -> Result<String, AppError> {
        let (user, semesters) = {
            let guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(AppError::Unauthorized)?;
            (session.user.clone(), session.semesters.clone())
        };
        self.templates.submit(&user, name, description, &semesters).await
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.set_scheduler(None);
    }
}

/// The periodic push of the active template for one signed-in user.
struct ActiveTemplatePush {
    uid: String,
    session: SharedSession,
    sync: Arc<CloudSync>,
    local: LocalStore,
}

#[async_trait]
impl SyncJob for ActiveTemplatePush {
    async fn run(&self) -> Result<(), AppError> {
        let write = self.sync.begin_write().await;
        let snapshot = {
            let guard = self.session.lock().await;
            match guard.as_ref() {
                Some(s) if s.uid() == self.uid && !s.is_first_launch => {
                    Some((s.semesters.clone(), s.template_info.clone()))
                }
                _ => None,
            }
        };
        let Some((semesters, info)) = snapshot else {
            debug!("Nothing to push for {}", self.uid);
            return Ok(());
        };

        self.sync
            .update_template_in_cloud(&write, &self.uid, &semesters, &info)
            .await?;
        drop(write);
        if let Some(at) = self.sync.last_sync_time() {
            self.local.set_last_synced(&self.uid, at).await?;
        }
        Ok(())
    }
}
