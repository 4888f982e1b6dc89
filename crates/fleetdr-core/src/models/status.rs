//! Status enumerations for DR tests and backups.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of the most recent DR test of a plan.
///
/// Transitions only along `(none|pending|passed|failed) -> running ->
/// (passed|failed)`; `running` is never the last persisted value once a test
/// returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Never tested
    Pending,

    /// A test pipeline is in flight
    Running,

    /// The last test restored successfully
    Passed,

    /// The last test failed at some step
    Failed,
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TestStatus::Pending),
            "running" => Ok(TestStatus::Running),
            "passed" => Ok(TestStatus::Passed),
            "failed" => Ok(TestStatus::Failed),
            _ => Err(format!("Invalid test status: {s}")),
        }
    }
}

impl TestStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pending => "pending",
            TestStatus::Running => "running",
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        }
    }

    /// True for the outcomes a finished test may leave behind.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestStatus::Passed | TestStatus::Failed)
    }

    /// Get status with an icon for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            TestStatus::Pending => "○ Pending",
            TestStatus::Running => "➤ Running",
            TestStatus::Passed => "✓ Passed",
            TestStatus::Failed => "✗ Failed",
        }
    }
}

/// Lifecycle of a backup artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl FromStr for BackupStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BackupStatus::Pending),
            "running" => Ok(BackupStatus::Running),
            "completed" => Ok(BackupStatus::Completed),
            "failed" => Ok(BackupStatus::Failed),
            _ => Err(format!("Invalid backup status: {s}")),
        }
    }
}

impl BackupStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Pending => "pending",
            BackupStatus::Running => "running",
            BackupStatus::Completed => "completed",
            BackupStatus::Failed => "failed",
        }
    }

    /// Pending and running backups are still being produced.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, BackupStatus::Pending | BackupStatus::Running)
    }
}
