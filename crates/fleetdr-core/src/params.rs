//! Parameter structures for DR operations
//!
//! Shared inputs used by every interface (CLI, MCP) without framework
//! specific derives. Interface layers wrap these: the CLI converts its clap
//! `Args` structs with `From`, the MCP server deserializes them through a
//! transparent wrapper that adds `JsonSchema`.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Schema generation is gated behind the `schema` feature so the core stays
//! lightweight for callers that only need the library.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cron::DEFAULT_SCHEDULE;

/// Default retention window for new plans.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default page size for plan listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: u32 = 200;

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Generic parameters for operations requiring just an ID.
///
/// Used for show, trigger_backup, trigger_test and prune.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub id: Uuid,
}

/// Parameters addressing one instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct InstanceId {
    /// ID of the instance
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub instance_id: Uuid,
}

/// Parameters for creating a DR plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateDrPlan {
    /// Instance the plan protects (required)
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub instance_id: Uuid,
    /// Five-field cron expression, defaults to "0 2 * * *"
    #[serde(default = "default_schedule")]
    pub backup_schedule_cron: String,
    /// Days to keep backups, defaults to 30
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Server DR tests and restores provision onto
    #[serde(default)]
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub target_server_id: Option<Uuid>,
}

impl CreateDrPlan {
    /// A plan for `instance_id` with the default schedule and retention.
    pub fn for_instance(instance_id: Uuid) -> Self {
        Self {
            instance_id,
            backup_schedule_cron: default_schedule(),
            retention_days: DEFAULT_RETENTION_DAYS,
            target_server_id: None,
        }
    }
}

/// Parameters for updating a DR plan.
///
/// Only supplied fields change. A blank `backup_schedule_cron` is treated as
/// not supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateDrPlan {
    /// Plan ID to update (required)
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub id: Uuid,
    /// New cron expression
    #[serde(default)]
    pub backup_schedule_cron: Option<String>,
    /// New retention window in days
    #[serde(default)]
    pub retention_days: Option<u32>,
    /// New DR target server
    #[serde(default)]
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub target_server_id: Option<Uuid>,
    /// Activate or deactivate scheduled backups
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Parameters for deleting a DR plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeleteDrPlan {
    /// Plan ID to delete
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub id: Uuid,
    /// Must be true; deletion is permanent
    #[serde(default)]
    pub confirmed: bool,
}

/// Parameters for listing DR plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListDrPlans {
    /// Page size, defaults to 50 and is capped at 200
    #[serde(default = "default_page_size")]
    pub limit: u32,
    /// Number of plans to skip
    #[serde(default)]
    pub offset: u32,
    /// Only plans whose instance belongs to this organization
    #[serde(default)]
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub organization_id: Option<Uuid>,
}

impl Default for ListDrPlans {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            organization_id: None,
        }
    }
}

impl ListDrPlans {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Parameters for restoring a backup into a new instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RestoreToServer {
    /// Completed backup to restore from
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub backup_id: Uuid,
    /// Server to provision the new instance on
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub target_server_id: Uuid,
    /// Organization code of the new instance, unique across the fleet
    pub new_org_code: String,
    /// Organization name, defaults to "Restore of {source name}"
    #[serde(default)]
    pub new_org_name: Option<String>,
    /// Admin password; generated when absent
    #[serde(default, skip_serializing)]
    pub admin_password: Option<String>,
}

/// Parameters for registering a server in the fleet registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterServer {
    /// Display name
    pub name: String,
    /// Hostname or address the hooks connect to
    pub hostname: String,
}

/// Parameters for registering an existing instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterInstance {
    /// Server hosting the instance
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub server_id: Uuid,
    /// Organization code, unique across the fleet
    pub org_code: String,
    /// Organization name
    pub org_name: String,
    /// Owning organization
    #[serde(default)]
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub org_id: Option<Uuid>,
    #[serde(default)]
    pub sector_type: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub git_tag: Option<String>,
}
