//! Collaborator interfaces the DR pipelines are composed from.
//!
//! The orchestrator never creates backup artifacts, moves files between
//! servers or deploys code itself. It drives three collaborators and records
//! what they report:
//!
//! - [`BackupOperation`]: creates and deletes restorable backup artifacts
//! - [`BackupTransfer`]: copies an artifact between two servers
//! - [`ProvisioningPipeline`]: creates, deploys, restores and migrates
//!   instances
//!
//! All calls are synchronous and may block for minutes; the async service
//! layer runs them on the blocking thread pool. [`hooks`] provides
//! implementations backed by operator-configured shell commands.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::Result,
    models::{Backup, DeployOutcome, Instance, NewInstance, Server},
};

pub mod hooks;

pub use hooks::{CommandHooks, HookConfig};

/// Creates point-in-time backups of instances.
pub trait BackupOperation: Send + Sync {
    /// Produces a backup of `instance`.
    ///
    /// Ordinary failures (backend unreachable, disk full) are reported as a
    /// backup with status `failed` and an error message, not as `Err`.
    fn create_backup(&self, instance: &Instance) -> Result<Backup>;

    /// Removes the artifact of an expired backup.
    fn delete_backup(&self, backup: &Backup) -> Result<()>;
}

/// Moves backup artifacts between servers.
pub trait BackupTransfer: Send + Sync {
    /// Copies `backup` from `source` to `target` and returns the path of the
    /// copy on `target`.
    fn transfer(&self, backup: &Backup, source: &Server, target: &Server) -> Result<String>;
}

/// Provisions instances and brings them to a running release.
pub trait ProvisioningPipeline: Send + Sync {
    /// Creates the instance described by `request`.
    fn create_instance(&self, request: &NewInstance) -> Result<Instance>;

    /// Deploys the application to `instance` with the given admin password.
    fn deploy(
        &self,
        instance: &Instance,
        deployment_id: Uuid,
        admin_password: &str,
    ) -> Result<DeployOutcome>;

    /// Drops any secret the deploy step left behind. Best-effort.
    fn clear_deploy_secret(&self, instance_id: Uuid, deployment_id: Uuid) -> Result<()>;

    /// Loads the data of `backup` into `instance`.
    fn restore_data(&self, instance: &Instance, backup: &Backup) -> Result<()>;

    /// Runs schema migrations on `instance`.
    fn migrate(&self, instance: &Instance) -> Result<()>;
}

/// The full set of collaborators a pipeline run needs.
#[derive(Clone)]
pub struct Collaborators {
    pub backups: Arc<dyn BackupOperation>,
    pub transfer: Arc<dyn BackupTransfer>,
    pub provisioning: Arc<dyn ProvisioningPipeline>,
}

impl Collaborators {
    pub fn new(
        backups: Arc<dyn BackupOperation>,
        transfer: Arc<dyn BackupTransfer>,
        provisioning: Arc<dyn ProvisioningPipeline>,
    ) -> Self {
        Self {
            backups,
            transfer,
            provisioning,
        }
    }

    /// Uses one set of command hooks for every collaborator.
    pub fn from_hooks(config: HookConfig) -> Self {
        let hooks = Arc::new(CommandHooks::new(config));
        Self {
            backups: hooks.clone(),
            transfer: hooks.clone(),
            provisioning: hooks,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
