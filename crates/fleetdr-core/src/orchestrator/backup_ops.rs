//! Scheduled backups and retention pruning.

use jiff::{SignedDuration, Timestamp};
use log::{info, warn};
use uuid::Uuid;

use super::Orchestrator;
use crate::{
    error::{DrError, Result},
    models::{Backup, DrPlan},
};

impl Orchestrator<'_> {
    /// Backs up the plan's instance.
    ///
    /// A failed backup is returned, not raised: the plan's `last_backup_at`
    /// only advances when the backup completed.
    pub fn run_scheduled_backup(&mut self, plan_id: Uuid) -> Result<Backup> {
        let plan = self.active_plan(plan_id)?;
        let instance = self
            .db
            .get_instance(plan.instance_id)?
            .ok_or(DrError::InstanceNotFound {
                id: plan.instance_id,
            })?;

        let backup = self.collaborators.backups.create_backup(&instance)?;
        self.db.record_backup(&backup)?;

        if backup.is_completed() {
            let completed_at = backup.completed_at.unwrap_or_else(Timestamp::now);
            self.db.record_last_backup(plan.id, completed_at)?;
            info!(
                "Backup {} of {} completed for DR plan {plan_id}",
                backup.id, instance.org_code
            );
        } else {
            warn!(
                "Backup {} of {} for DR plan {plan_id} ended {}: {}",
                backup.id,
                instance.org_code,
                backup.status.as_str(),
                backup.error_message.as_deref().unwrap_or("no error message")
            );
        }

        Ok(backup)
    }

    /// Deletes the plan instance's backups created before
    /// `now - retention_days`. Pending and running backups are kept.
    ///
    /// Returns the number of backups removed.
    pub fn prune_expired_backups(&mut self, plan_id: Uuid, now: Timestamp) -> Result<usize> {
        let plan = self.get_dr_plan(plan_id)?;
        let cutoff = retention_cutoff(&plan, now)?;

        let mut pruned = 0;
        for backup in self.db.list_backups_for_instance(plan.instance_id)? {
            if backup.status.is_in_flight() || backup.created_at >= cutoff {
                continue;
            }
            if backup.file_path.is_some() {
                self.collaborators.backups.delete_backup(&backup)?;
            }
            self.db.delete_backup(backup.id)?;
            pruned += 1;
        }

        if pruned > 0 {
            info!("Pruned {pruned} expired backups for DR plan {plan_id}");
        }
        Ok(pruned)
    }

    fn active_plan(&self, plan_id: Uuid) -> Result<DrPlan> {
        let plan = self.get_dr_plan(plan_id)?;
        if !plan.is_active {
            return Err(DrError::PlanInactive { id: plan_id });
        }
        Ok(plan)
    }
}

fn retention_cutoff(plan: &DrPlan, now: Timestamp) -> Result<Timestamp> {
    let window = SignedDuration::from_hours(i64::from(plan.retention_days) * 24);
    now.checked_sub(window).map_err(|e| {
        DrError::invalid_input("retention_days")
            .with_reason(format!("retention window out of range: {e}"))
    })
}
