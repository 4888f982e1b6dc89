//! DR plan model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TestStatus;

/// Maximum stored length, in characters, of a failed test's message.
pub const MAX_TEST_MESSAGE_CHARS: usize = 2000;

/// Backup cadence, retention policy and failover target for one instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrPlan {
    /// Unique identifier for the plan
    pub id: Uuid,

    /// Instance whose data this plan protects
    pub instance_id: Uuid,

    /// Five-field cron expression driving scheduled backups
    pub backup_schedule_cron: String,

    /// Backups older than this many days are eligible for pruning
    pub retention_days: u32,

    /// Server that DR tests and restores provision onto
    pub target_server_id: Option<Uuid>,

    /// Completion time of the last successful backup
    pub last_backup_at: Option<Timestamp>,

    /// Time the last DR test finished
    pub last_tested_at: Option<Timestamp>,

    pub last_test_status: Option<TestStatus>,

    pub last_test_message: Option<String>,

    /// Inactive plans are skipped by the scheduler
    pub is_active: bool,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl DrPlan {
    /// Truncates a failure message to the stored maximum, on a char boundary.
    pub fn truncate_message(message: &str) -> String {
        message.chars().take(MAX_TEST_MESSAGE_CHARS).collect()
    }
}
