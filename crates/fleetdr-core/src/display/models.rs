//! Display implementations for domain models.
//!
//! Markdown output with status icons; timestamps in the system timezone.

use std::fmt;

use super::datetime::{LocalDateTime, OptionalDateTime};
use crate::{
    models::{Backup, BackupStatus, DrPlan, DrStatus, Instance, Server, TestStatus},
    orchestrator::DrTestResult,
};

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DrPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# DR plan {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Instance: {}", self.instance_id)?;
        writeln!(f, "- Schedule: `{}`", self.backup_schedule_cron)?;
        writeln!(f, "- Retention: {} days", self.retention_days)?;
        match self.target_server_id {
            Some(server_id) => writeln!(f, "- Target server: {server_id}")?,
            None => writeln!(f, "- Target server: not set")?,
        }
        writeln!(
            f,
            "- Active: {}",
            if self.is_active { "yes" } else { "no" }
        )?;
        writeln!(
            f,
            "- Last backup: {}",
            OptionalDateTime(self.last_backup_at.as_ref())
        )?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        writeln!(f)?;
        writeln!(f, "## Last DR test")?;
        writeln!(f)?;
        match self.last_test_status {
            Some(status) => {
                writeln!(f, "- Status: {}", status.with_icon())?;
                writeln!(
                    f,
                    "- Tested: {}",
                    OptionalDateTime(self.last_tested_at.as_ref())
                )?;
                if let Some(message) = &self.last_test_message {
                    writeln!(f)?;
                    writeln!(f, "{message}")?;
                }
            }
            None => writeln!(f, "Never tested.")?,
        }

        Ok(())
    }
}

impl DrPlan {
    /// One list entry: schedule, state and last outcomes.
    pub(crate) fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_active { "" } else { " (inactive)" };
        writeln!(f, "## {}{state}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- **Instance**: {}", self.instance_id)?;
        writeln!(f, "- **Schedule**: `{}`", self.backup_schedule_cron)?;
        writeln!(f, "- **Retention**: {} days", self.retention_days)?;
        writeln!(
            f,
            "- **Last backup**: {}",
            OptionalDateTime(self.last_backup_at.as_ref())
        )?;
        if let Some(status) = self.last_test_status {
            writeln!(f, "- **Last test**: {}", status.with_icon())?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- **{}** `{}` ({})", self.name, self.hostname, self.id)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} ({})", self.org_code, self.id)?;
        writeln!(f)?;
        writeln!(f, "- Organization: {}", self.org_name)?;
        writeln!(f, "- Server: {}", self.server_id)?;
        if let Some(org_id) = self.org_id {
            writeln!(f, "- Organization ID: {org_id}")?;
        }
        if let Some(framework) = &self.framework {
            writeln!(f, "- Framework: {framework}")?;
        }
        match (&self.git_branch, &self.git_tag) {
            (Some(branch), Some(tag)) => writeln!(f, "- Release: {branch} @ {tag}")?,
            (Some(branch), None) => writeln!(f, "- Release: {branch}")?,
            (None, Some(tag)) => writeln!(f, "- Release: {tag}")?,
            (None, None) => {}
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for Backup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- `{}` {}", self.id, self.status)?;
        if let Some(path) = &self.file_path {
            write!(f, " `{path}`")?;
        }
        if let Some(size) = self.size_bytes {
            write!(f, " ({size} bytes)")?;
        }
        write!(f, ", created {}", LocalDateTime(&self.created_at))?;
        if let Some(error) = &self.error_message {
            write!(f, ": {error}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for DrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(plan) = &self.plan else {
            return writeln!(f, "Disaster recovery is not configured for this instance.");
        };

        writeln!(f, "Disaster recovery is configured (plan {}).", plan.dr_plan_id)?;
        writeln!(f)?;
        writeln!(f, "- Schedule: `{}`", plan.backup_schedule_cron)?;
        writeln!(f, "- Retention: {} days", plan.retention_days)?;
        writeln!(
            f,
            "- Target server: {}",
            plan.target_server_id.as_deref().unwrap_or("not set")
        )?;
        writeln!(
            f,
            "- Last backup: {}",
            plan.last_backup_at.as_deref().unwrap_or("never")
        )?;
        writeln!(
            f,
            "- Last test: {}",
            plan.last_test_status.as_deref().unwrap_or("never")
        )?;
        if let Some(message) = &plan.last_test_message {
            writeln!(f, "- Test message: {message}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DrTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.instance_id, &self.error) {
            (Some(instance_id), _) if self.success => {
                writeln!(f, "DR test passed: restored into instance {instance_id}")
            }
            (_, Some(error)) => writeln!(f, "DR test failed: {error}"),
            _ => writeln!(
                f,
                "DR test {}",
                if self.success { "passed" } else { "failed" }
            ),
        }
    }
}
