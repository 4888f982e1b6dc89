//! Pipeline runs for the DrService: inline, or queued as background tasks.
//!
//! Backups, DR tests and prunes take their plan's advisory lock before any
//! work starts. The guard moves into the blocking task, so the lock is held
//! until the pipeline finishes even if the awaiting caller goes away.

use jiff::Timestamp;
use log::{error, info, warn};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::DrService;
use crate::{
    error::Result,
    models::{Backup, Instance},
    orchestrator::DrTestResult,
    params::{Id, RestoreToServer},
};

/// Handle of a pipeline run queued in the background.
#[derive(Debug)]
pub struct QueuedTask {
    /// Identifier reported to the caller; appears in the task's log lines
    pub task_id: Uuid,
    pub handle: JoinHandle<()>,
}

impl DrService {
    /// Backs up the plan's instance now.
    ///
    /// Returns the backup whatever its status; only a completed backup
    /// advances the plan's `last_backup_at`.
    pub async fn run_scheduled_backup(&self, params: &Id) -> Result<Backup> {
        let plan_id = params.id;
        let guard = self.locks.try_acquire(plan_id)?;
        self.run_blocking(move |orchestrator| {
            let _guard = guard;
            orchestrator.run_scheduled_backup(plan_id)
        })
        .await
    }

    /// Runs a DR test of the plan now.
    ///
    /// Pipeline failures are recorded on the plan and returned as an
    /// unsuccessful [`DrTestResult`].
    pub async fn test_dr(&self, params: &Id) -> Result<DrTestResult> {
        let plan_id = params.id;
        let guard = self.locks.try_acquire(plan_id)?;
        self.run_blocking(move |orchestrator| {
            let _guard = guard;
            orchestrator.test_dr(plan_id)
        })
        .await
    }

    /// Restores a completed backup into a new instance on the target server.
    pub async fn restore_to_server(&self, params: &RestoreToServer) -> Result<Instance> {
        let params = params.clone();
        self.run_blocking(move |orchestrator| orchestrator.restore_to_server(&params))
            .await
    }

    /// Deletes the plan instance's backups older than its retention window.
    pub async fn prune_expired_backups(&self, params: &Id, now: Timestamp) -> Result<usize> {
        let plan_id = params.id;
        let guard = self.locks.try_acquire(plan_id)?;
        self.run_blocking(move |orchestrator| {
            let _guard = guard;
            orchestrator.prune_expired_backups(plan_id, now)
        })
        .await
    }

    /// Queues a scheduled backup and returns immediately.
    pub fn enqueue_backup(&self, plan_id: Uuid) -> QueuedTask {
        let service = self.clone();
        let task_id = Uuid::new_v4();
        let handle = tokio::spawn(async move {
            match service.run_scheduled_backup(&Id { id: plan_id }).await {
                Ok(backup) => info!(
                    "Task {task_id}: backup {} of plan {plan_id} is {}",
                    backup.id,
                    backup.status.as_str()
                ),
                Err(e) => warn!("Task {task_id}: backup of plan {plan_id} failed: {e}"),
            }
        });
        QueuedTask { task_id, handle }
    }

    /// Queues a DR test and returns immediately. The outcome is polled
    /// through the plan's test status.
    pub fn enqueue_test(&self, plan_id: Uuid) -> QueuedTask {
        let service = self.clone();
        let task_id = Uuid::new_v4();
        let handle = tokio::spawn(async move {
            match service.test_dr(&Id { id: plan_id }).await {
                Ok(result) if result.success => {
                    info!("Task {task_id}: DR test of plan {plan_id} passed")
                }
                Ok(result) => warn!(
                    "Task {task_id}: DR test of plan {plan_id} failed: {}",
                    result.error.unwrap_or_default()
                ),
                Err(e) => error!("Task {task_id}: DR test of plan {plan_id} not run: {e}"),
            }
        });
        QueuedTask { task_id, handle }
    }

    /// Queues a restore and returns immediately.
    pub fn enqueue_restore(&self, params: RestoreToServer) -> QueuedTask {
        let service = self.clone();
        let task_id = Uuid::new_v4();
        let handle = tokio::spawn(async move {
            match service.restore_to_server(&params).await {
                Ok(instance) => info!(
                    "Task {task_id}: restored backup {} into {} ({})",
                    params.backup_id, instance.org_code, instance.id
                ),
                Err(e) => error!(
                    "Task {task_id}: restore of backup {} failed: {e}",
                    params.backup_id
                ),
            }
        });
        QueuedTask { task_id, handle }
    }
}
