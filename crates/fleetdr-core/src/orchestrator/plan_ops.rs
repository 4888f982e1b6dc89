//! DR plan lifecycle: create, update, delete and lookups.

use log::info;
use uuid::Uuid;

use super::Orchestrator;
use crate::{
    cron,
    error::{DrError, Result},
    models::{DrPlan, DrStatus, UpdateDrPlanRequest},
    params::{CreateDrPlan, ListDrPlans},
};

impl Orchestrator<'_> {
    /// Creates an active plan after checking its references and schedule.
    pub fn create_dr_plan(&mut self, params: &CreateDrPlan) -> Result<DrPlan> {
        if self.db.get_instance(params.instance_id)?.is_none() {
            return Err(DrError::InstanceNotFound {
                id: params.instance_id,
            });
        }
        cron::validate(&params.backup_schedule_cron)?;
        if let Some(server_id) = params.target_server_id {
            self.require_server(server_id)?;
        }

        let plan = self.db.create_plan(
            params.instance_id,
            params.backup_schedule_cron.trim(),
            params.retention_days,
            params.target_server_id,
        )?;
        info!(
            "Created DR plan {} for instance {} ({})",
            plan.id, plan.instance_id, plan.backup_schedule_cron
        );
        Ok(plan)
    }

    /// Applies a partial update. Returns the plan and the changed fields.
    pub fn update_dr_plan(
        &mut self,
        id: Uuid,
        request: &UpdateDrPlanRequest,
    ) -> Result<(DrPlan, Vec<String>)> {
        if let Some(ref expression) = request.backup_schedule_cron {
            cron::validate(expression)?;
        }
        if self.db.get_plan(id)?.is_none() {
            return Err(DrError::PlanNotFound { id });
        }
        if let Some(server_id) = request.target_server_id {
            self.require_server(server_id)?;
        }

        let (plan, changes) = self.db.update_plan(id, request)?;
        if !changes.is_empty() {
            info!("Updated DR plan {id}: {}", changes.join(", "));
        }
        Ok((plan, changes))
    }

    /// Hard-deletes a plan and returns what was removed.
    pub fn delete_dr_plan(&mut self, id: Uuid) -> Result<DrPlan> {
        let plan = self.get_dr_plan(id)?;
        self.db.delete_plan(id)?;
        info!("Deleted DR plan {id}");
        Ok(plan)
    }

    pub fn get_dr_plan(&self, id: Uuid) -> Result<DrPlan> {
        self.db
            .get_plan(id)?
            .ok_or(DrError::PlanNotFound { id })
    }

    /// One page of plans, optionally restricted to an organization.
    pub fn list_dr_plans(&self, params: &ListDrPlans) -> Result<Vec<DrPlan>> {
        let limit = params.effective_limit();
        match params.organization_id {
            Some(org_id) => self
                .db
                .list_plans_for_organization(org_id, limit, params.offset),
            None => self.db.list_plans(limit, params.offset),
        }
    }

    /// Plans the scheduler evaluates on each tick.
    pub fn list_active_plans(&self) -> Result<Vec<DrPlan>> {
        self.db.list_active_plans()
    }

    /// DR configuration summary for an instance.
    pub fn get_dr_status(&self, instance_id: Uuid) -> Result<DrStatus> {
        Ok(match self.db.get_plan_for_instance(instance_id)? {
            Some(plan) => DrStatus::configured(&plan),
            None => DrStatus::not_configured(),
        })
    }

    fn require_server(&self, id: Uuid) -> Result<()> {
        match self.db.get_server(id)? {
            Some(_) => Ok(()),
            None => Err(DrError::ServerNotFound { id }),
        }
    }
}
