//! Fleet registry operations behind the admin surfaces.

use log::info;
use uuid::Uuid;

use super::Orchestrator;
use crate::{
    error::{DrError, Result},
    models::{Backup, Instance, NewInstance, Server},
    params::{RegisterInstance, RegisterServer},
};

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DrError::invalid_input(field).with_reason("must not be empty"));
    }
    Ok(())
}

impl Orchestrator<'_> {
    pub fn register_server(&mut self, params: &RegisterServer) -> Result<Server> {
        require_text("name", &params.name)?;
        require_text("hostname", &params.hostname)?;

        let server = self
            .db
            .insert_server(params.name.trim(), params.hostname.trim())?;
        info!("Registered server {} ({})", server.name, server.id);
        Ok(server)
    }

    /// Records an instance that already runs on a registered server.
    pub fn register_instance(&mut self, params: &RegisterInstance) -> Result<Instance> {
        require_text("org_code", &params.org_code)?;
        require_text("org_name", &params.org_name)?;
        if self.db.get_server(params.server_id)?.is_none() {
            return Err(DrError::ServerNotFound {
                id: params.server_id,
            });
        }
        let org_code = params.org_code.trim();
        if self.db.org_code_exists(org_code)? {
            return Err(DrError::invalid_input("org_code")
                .with_reason(format!("organization code '{org_code}' is already in use")));
        }

        let mut instance = Instance::from_new(&NewInstance {
            server_id: params.server_id,
            org_id: params.org_id,
            org_code: org_code.to_string(),
            org_name: params.org_name.trim().to_string(),
            sector_type: params.sector_type.clone(),
            framework: params.framework.clone(),
            currency: params.currency.clone(),
            admin_email: params.admin_email.clone(),
            admin_username: params.admin_username.clone(),
            git_repo_id: None,
            catalog_item_id: None,
        });
        instance.git_branch = params.git_branch.clone();
        instance.git_tag = params.git_tag.clone();

        self.db.insert_instance(&instance)?;
        info!("Registered instance {} ({})", instance.org_code, instance.id);
        Ok(instance)
    }

    pub fn list_servers(&self) -> Result<Vec<Server>> {
        self.db.list_servers()
    }

    pub fn list_instances(&self) -> Result<Vec<Instance>> {
        self.db.list_instances()
    }

    /// Backups of an instance, newest first.
    pub fn list_backups(&self, instance_id: Uuid) -> Result<Vec<Backup>> {
        if self.db.get_instance(instance_id)?.is_none() {
            return Err(DrError::InstanceNotFound { id: instance_id });
        }
        self.db.list_backups_for_instance(instance_id)
    }
}
