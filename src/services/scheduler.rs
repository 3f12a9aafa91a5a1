use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::AppError;

/// One round of background synchronization.
#[async_trait]
pub trait SyncJob: Send + Sync {
    async fn run(&self) -> Result<(), AppError>;
}

/// Runs a sync job on a fixed interval.
pub struct SyncScheduler {
    job: Arc<dyn SyncJob>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(job: Arc<dyn SyncJob>, interval: Duration) -> Self {
        Self { job, interval }
    }

    /// Loops forever; cancel by aborting the task.
    pub async fn start(self) {
        info!("Starting auto-sync scheduler (interval: {:?})", self.interval);

        loop {
            // wait a full interval before the first run
            tokio::time::sleep(self.interval).await;

            match self.job.run().await {
                Ok(()) => debug!("Auto-sync completed"),
                Err(e) => {
                    // a failed round never stops the loop
                    tracing::warn!("Auto-sync failed: {:?}", e);
                }
            }
        }
    }

    pub fn spawn(self) -> SchedulerHandle {
        SchedulerHandle {
            task: tokio::spawn(self.start()),
        }
    }
}

/// Aborts the scheduler task when cancelled or dropped.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
