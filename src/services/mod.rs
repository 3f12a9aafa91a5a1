pub mod cloud_sync;
pub mod scheduler;
pub mod template_service;
pub mod tracker;

pub use cloud_sync::{CloudSync, SyncStatus, WriteGuard, is_remote_newer, restore_from_cloud};
pub use scheduler::{SchedulerHandle, SyncJob, SyncScheduler};
pub use template_service::TemplateService;
pub use tracker::{SessionView, Tracker};
