//! Transport-neutral serializations of DR plans.

use serde::{Deserialize, Serialize};

use super::DrPlan;

/// Flat record of a plan: ids as strings, ISO-8601 timestamps, enum values
/// as lowercase strings and absent values as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrPlanRecord {
    pub dr_plan_id: String,
    pub instance_id: String,
    pub backup_schedule_cron: String,
    pub retention_days: u32,
    pub target_server_id: Option<String>,
    pub is_active: bool,
    pub last_backup_at: Option<String>,
    pub last_tested_at: Option<String>,
    pub last_test_status: Option<String>,
    pub last_test_message: Option<String>,
    pub created_at: Option<String>,
}

impl From<&DrPlan> for DrPlanRecord {
    fn from(plan: &DrPlan) -> Self {
        Self {
            dr_plan_id: plan.id.to_string(),
            instance_id: plan.instance_id.to_string(),
            backup_schedule_cron: plan.backup_schedule_cron.clone(),
            retention_days: plan.retention_days,
            target_server_id: plan.target_server_id.map(|id| id.to_string()),
            is_active: plan.is_active,
            last_backup_at: plan.last_backup_at.map(|ts| ts.to_string()),
            last_tested_at: plan.last_tested_at.map(|ts| ts.to_string()),
            last_test_status: plan.last_test_status.map(|s| s.as_str().to_string()),
            last_test_message: plan.last_test_message.clone(),
            created_at: Some(plan.created_at.to_string()),
        }
    }
}

impl From<DrPlan> for DrPlanRecord {
    fn from(plan: DrPlan) -> Self {
        Self::from(&plan)
    }
}

/// DR configuration summary for one instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrStatus {
    pub configured: bool,
    #[serde(flatten)]
    pub plan: Option<DrPlanRecord>,
}

impl DrStatus {
    pub fn not_configured() -> Self {
        Self {
            configured: false,
            plan: None,
        }
    }

    pub fn configured(plan: &DrPlan) -> Self {
        Self {
            configured: true,
            plan: Some(plan.into()),
        }
    }
}
