//! Fleet entities referenced by DR plans: servers, instances and backups.
//!
//! These rows belong to the wider platform. The DR pipelines read them,
//! record what the collaborators hand back, and touch only a few columns
//! (backup location, instance release fields).

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BackupStatus;

/// A host that runs tenant instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    pub hostname: String,
    pub created_at: Timestamp,
}

/// One isolated deployment of the tenant application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instance {
    pub id: Uuid,
    pub server_id: Uuid,
    /// Owning organization, used for per-organization plan listings
    pub org_id: Option<Uuid>,
    /// Unique across the fleet
    pub org_code: String,
    pub org_name: String,
    pub sector_type: Option<String>,
    pub framework: Option<String>,
    pub currency: Option<String>,
    pub admin_email: Option<String>,
    pub admin_username: Option<String>,
    pub git_repo_id: Option<Uuid>,
    pub catalog_item_id: Option<Uuid>,
    /// Subscription plan the instance is billed under
    pub subscription_plan_id: Option<Uuid>,
    pub git_branch: Option<String>,
    pub git_tag: Option<String>,
    pub created_at: Timestamp,
}

impl Instance {
    /// Materializes a creation request into a record with a fresh id.
    ///
    /// Release fields (subscription plan, branch, tag) start empty; they are
    /// assigned in a second step.
    pub fn from_new(new: &NewInstance) -> Self {
        Self {
            id: Uuid::new_v4(),
            server_id: new.server_id,
            org_id: new.org_id,
            org_code: new.org_code.clone(),
            org_name: new.org_name.clone(),
            sector_type: new.sector_type.clone(),
            framework: new.framework.clone(),
            currency: new.currency.clone(),
            admin_email: new.admin_email.clone(),
            admin_username: new.admin_username.clone(),
            git_repo_id: new.git_repo_id,
            catalog_item_id: new.catalog_item_id,
            subscription_plan_id: None,
            git_branch: None,
            git_tag: None,
            created_at: Timestamp::now(),
        }
    }
}

/// Constructor parameters for provisioning an instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewInstance {
    pub server_id: Uuid,
    pub org_id: Option<Uuid>,
    pub org_code: String,
    pub org_name: String,
    pub sector_type: Option<String>,
    pub framework: Option<String>,
    pub currency: Option<String>,
    pub admin_email: Option<String>,
    pub admin_username: Option<String>,
    pub git_repo_id: Option<Uuid>,
    pub catalog_item_id: Option<Uuid>,
}

impl NewInstance {
    /// Builds the request for a restore of `source` onto `server_id`.
    ///
    /// Copies organization, sector, framework, currency, admin identity, git
    /// repository and catalog linkage. When no name is given the new
    /// instance is called "Restore of {source name}".
    pub fn restore_of(
        source: &Instance,
        server_id: Uuid,
        org_code: &str,
        org_name: Option<&str>,
    ) -> Self {
        Self {
            server_id,
            org_id: source.org_id,
            org_code: org_code.to_string(),
            org_name: org_name
                .map(String::from)
                .unwrap_or_else(|| format!("Restore of {}", source.org_name)),
            sector_type: source.sector_type.clone(),
            framework: source.framework.clone(),
            currency: source.currency.clone(),
            admin_email: source.admin_email.clone(),
            admin_username: source.admin_username.clone(),
            git_repo_id: source.git_repo_id,
            catalog_item_id: source.catalog_item_id,
        }
    }
}

/// A point-in-time backup artifact of an instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Backup {
    pub id: Uuid,
    pub instance_id: Uuid,
    pub status: BackupStatus,
    /// Location of the artifact on the server that holds it
    pub file_path: Option<String>,
    pub size_bytes: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Backup {
    /// A finished backup stored at `file_path`.
    pub fn completed(instance_id: Uuid, file_path: impl Into<String>, completed_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            instance_id,
            status: BackupStatus::Completed,
            file_path: Some(file_path.into()),
            size_bytes: None,
            error_message: None,
            created_at: completed_at,
            completed_at: Some(completed_at),
        }
    }

    /// A backup attempt that failed with `error_message`.
    pub fn failed(instance_id: Uuid, error_message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            instance_id,
            status: BackupStatus::Failed,
            file_path: None,
            size_bytes: None,
            error_message: Some(error_message.into()),
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// True when the backup can be restored from.
    pub fn is_completed(&self) -> bool {
        self.status == BackupStatus::Completed
    }
}

/// Result reported by the deploy step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl DeployOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
