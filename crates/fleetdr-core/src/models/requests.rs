//! Request types for updating models.

use uuid::Uuid;

use crate::{cron, error::Result};

/// Partial update of a DR plan: `None` leaves the field unchanged.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateDrPlanRequest {
    pub backup_schedule_cron: Option<String>,
    pub retention_days: Option<u32>,
    pub target_server_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl UpdateDrPlanRequest {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.backup_schedule_cron.is_none()
            && self.retention_days.is_none()
            && self.target_server_id.is_none()
            && self.is_active.is_none()
    }
}

impl TryFrom<crate::params::UpdateDrPlan> for UpdateDrPlanRequest {
    type Error = crate::DrError;

    /// Validate an update and drop blank cron strings.
    ///
    /// A blank `backup_schedule_cron` counts as "not supplied"; anything else
    /// must parse as a cron expression.
    fn try_from(params: crate::params::UpdateDrPlan) -> Result<Self> {
        let backup_schedule_cron = match params.backup_schedule_cron {
            Some(expr) if expr.trim().is_empty() => None,
            Some(expr) => {
                cron::validate(&expr)?;
                Some(expr.trim().to_string())
            }
            None => None,
        };

        Ok(Self {
            backup_schedule_cron,
            retention_days: params.retention_days,
            target_server_id: params.target_server_id,
            is_active: params.is_active,
        })
    }
}
