//! Restore-to-server: provisions a new instance from a completed backup.

use log::{info, warn};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use super::Orchestrator;
use crate::{
    error::{DrError, Result},
    models::{Instance, NewInstance},
    params::RestoreToServer,
};

/// Candidate codes tried before giving up: the base, then `_1` to `_9`.
pub const MAX_ORG_CODE_ATTEMPTS: usize = 10;

const ADMIN_PASSWORD_LEN: usize = 22;

/// Random alphanumeric admin password for a freshly provisioned instance.
pub fn generate_admin_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ADMIN_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Picks the first free code among `base`, `base_1` .. `base_9`.
pub fn allocate_org_code<F>(base: &str, mut is_taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    for attempt in 0..MAX_ORG_CODE_ATTEMPTS {
        let candidate = match attempt {
            0 => base.to_string(),
            n => format!("{base}_{n}"),
        };
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(DrError::pipeline(format!(
        "Could not allocate a unique organization code for {base} after {MAX_ORG_CODE_ATTEMPTS} attempts"
    )))
}

impl Orchestrator<'_> {
    /// Provisions a new instance on the target server from a completed
    /// backup.
    ///
    /// A failure after the instance is created leaves it in place,
    /// partially provisioned; nothing is rolled back.
    pub fn restore_to_server(&mut self, params: &RestoreToServer) -> Result<Instance> {
        let new_org_code = params.new_org_code.trim();
        if new_org_code.is_empty() {
            return Err(DrError::invalid_input("new_org_code").with_reason("must not be empty"));
        }

        let mut backup = self
            .db
            .get_backup(params.backup_id)?
            .filter(|backup| backup.is_completed())
            .ok_or_else(|| DrError::pipeline("Backup not found or not completed"))?;
        let source = self
            .db
            .get_instance(backup.instance_id)?
            .ok_or_else(|| DrError::pipeline("Source instance not found"))?;
        let target = self
            .db
            .get_server(params.target_server_id)?
            .ok_or_else(|| DrError::pipeline("Target server not found"))?;
        if self.db.org_code_exists(new_org_code)? {
            return Err(DrError::invalid_input("new_org_code")
                .with_reason(format!("organization code '{new_org_code}' is already in use")));
        }

        let admin_password = params
            .admin_password
            .clone()
            .filter(|password| !password.is_empty())
            .unwrap_or_else(generate_admin_password);

        let request = NewInstance::restore_of(
            &source,
            target.id,
            new_org_code,
            params.new_org_name.as_deref(),
        );
        let mut instance = self.collaborators.provisioning.create_instance(&request)?;
        self.db.insert_instance(&instance)?;

        // Release fields are not constructor inputs
        self.db.assign_instance_release(
            instance.id,
            source.subscription_plan_id,
            source.git_branch.as_deref(),
            source.git_tag.as_deref(),
        )?;
        instance.subscription_plan_id = source.subscription_plan_id;
        instance.git_branch = source.git_branch.clone();
        instance.git_tag = source.git_tag.clone();
        info!(
            "Created instance {} on {} from backup {}",
            instance.org_code, target.name, backup.id
        );

        let source_server = self
            .db
            .get_server(source.server_id)?
            .ok_or_else(|| DrError::pipeline("Source server not found"))?;
        if source_server.id != target.id {
            let path = self
                .collaborators
                .transfer
                .transfer(&backup, &source_server, &target)?;
            self.db.update_backup_file_path(backup.id, &path)?;
            info!(
                "Transferred backup {} from {} to {}",
                backup.id, source_server.name, target.name
            );
            backup.file_path = Some(path);
        }

        let deployment_id = Uuid::new_v4();
        let deployed = self
            .collaborators
            .provisioning
            .deploy(&instance, deployment_id, &admin_password);
        if let Err(e) = self
            .collaborators
            .provisioning
            .clear_deploy_secret(instance.id, deployment_id)
        {
            warn!("Failed to clear deploy secret of {}: {e}", instance.org_code);
        }
        let outcome = deployed?;
        if !outcome.success {
            let message = outcome
                .error
                .filter(|error| !error.trim().is_empty())
                .unwrap_or_else(|| "Deploy failed".to_string());
            return Err(DrError::pipeline(message));
        }

        self.collaborators
            .provisioning
            .restore_data(&instance, &backup)?;
        self.collaborators.provisioning.migrate(&instance)?;

        info!(
            "Restored backup {} into {} ({})",
            backup.id, instance.org_code, instance.id
        );
        Ok(instance)
    }
}
