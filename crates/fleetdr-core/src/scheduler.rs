//! Periodic driver for scheduled backups and retention pruning.
//!
//! Each tick evaluates every active plan's cron schedule against its last
//! backup and queues a background backup for the plans that are due. A
//! slower cadence prunes expired backups plan by plan. Failures are isolated
//! per plan: they are logged and counted, never fatal for the batch.

use std::{future::Future, time::Duration};

use jiff::Timestamp;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{cron, error::Result, params::Id, service::DrService};

/// Cadence of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub prune_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            prune_interval: Duration::from_secs(3600),
        }
    }
}

/// What one scheduling tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Plans whose backup was queued
    pub dispatched: Vec<Uuid>,
    /// Plans that were not due
    pub skipped: usize,
    /// Due plans left alone because a pipeline already holds their lock
    pub busy: usize,
    /// Queued backups; dropping them leaves the tasks running
    pub handles: Vec<JoinHandle<()>>,
}

impl TickReport {
    /// Waits for every queued backup to finish.
    pub async fn wait(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("Scheduled backup task did not finish: {e}");
            }
        }
    }
}

/// Totals of one prune run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub pruned: usize,
    pub plans_checked: usize,
    pub failures: usize,
}

/// Drives scheduled backups and pruning for a [`DrService`].
#[derive(Debug, Clone)]
pub struct Scheduler {
    service: DrService,
}

impl Scheduler {
    pub fn new(service: DrService) -> Self {
        Self { service }
    }

    /// Queues a backup for every active plan that is due at `now`.
    pub async fn tick_at(&self, now: Timestamp) -> Result<TickReport> {
        let plans = self.service.list_active_plans().await?;
        let mut report = TickReport::default();

        for plan in plans {
            if !cron::is_due(&plan.backup_schedule_cron, plan.last_backup_at, now) {
                debug!("DR plan {} not due", plan.id);
                report.skipped += 1;
                continue;
            }
            if self.service.locks().is_held(plan.id) {
                warn!("DR plan {} is due but a pipeline is still running", plan.id);
                report.busy += 1;
                continue;
            }

            let queued = self.service.enqueue_backup(plan.id);
            debug!("Queued backup of DR plan {} as task {}", plan.id, queued.task_id);
            report.dispatched.push(plan.id);
            report.handles.push(queued.handle);
        }

        info!(
            "Scheduled backup check: {} dispatched, {} skipped, {} busy",
            report.dispatched.len(),
            report.skipped,
            report.busy
        );
        Ok(report)
    }

    /// Prunes expired backups of every active plan.
    pub async fn prune_at(&self, now: Timestamp) -> Result<PruneReport> {
        let plans = self.service.list_active_plans().await?;
        let mut report = PruneReport {
            plans_checked: plans.len(),
            ..Default::default()
        };

        for plan in plans {
            match self
                .service
                .prune_expired_backups(&Id { id: plan.id }, now)
                .await
            {
                Ok(pruned) => report.pruned += pruned,
                Err(e) => {
                    warn!("Error pruning backups for DR plan {}: {e}", plan.id);
                    report.failures += 1;
                }
            }
        }

        info!(
            "Pruned {} expired backups across {} plans ({} failures)",
            report.pruned, report.plans_checked, report.failures
        );
        Ok(report)
    }

    /// Ticks and prunes on their cadences until `shutdown` resolves.
    ///
    /// Backups already queued keep running after shutdown.
    pub async fn run<F>(&self, config: SchedulerConfig, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut tick = interval(config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut prune = interval(config.prune_interval);
        prune.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);
        info!(
            "Scheduler started: tick every {:?}, prune every {:?}",
            config.tick_interval, config.prune_interval
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler shutting down");
                    break;
                }
                _ = tick.tick() => {
                    if let Err(e) = self.tick_at(Timestamp::now()).await {
                        warn!("Scheduled backup check failed: {e}");
                    }
                }
                _ = prune.tick() => {
                    if let Err(e) = self.prune_at(Timestamp::now()).await {
                        warn!("Backup pruning failed: {e}");
                    }
                }
            }
        }

        Ok(())
    }
}
