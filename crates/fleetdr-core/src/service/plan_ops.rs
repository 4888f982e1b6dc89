//! Plan and fleet registry operations for the DrService.

use super::DrService;
use crate::{
    error::{DrError, Result},
    models::{Backup, DrPlan, DrStatus, Instance, Server, UpdateDrPlanRequest},
    params::{
        CreateDrPlan, DeleteDrPlan, Id, InstanceId, ListDrPlans, RegisterInstance, RegisterServer,
        UpdateDrPlan,
    },
};

impl DrService {
    /// Creates a DR plan for an existing instance.
    ///
    /// # Errors
    ///
    /// * `DrError::InstanceNotFound` - the instance does not exist
    /// * `DrError::InvalidCron` - the schedule does not parse
    /// * `DrError::ServerNotFound` - the target server does not exist
    pub async fn create_dr_plan(&self, params: &CreateDrPlan) -> Result<DrPlan> {
        let params = params.clone();
        self.run_blocking(move |orchestrator| orchestrator.create_dr_plan(&params))
            .await
    }

    /// Retrieves a plan by its ID.
    pub async fn get_dr_plan(&self, params: &Id) -> Result<Option<DrPlan>> {
        let plan_id = params.id;
        self.run_blocking(move |orchestrator| match orchestrator.get_dr_plan(plan_id) {
            Ok(plan) => Ok(Some(plan)),
            Err(DrError::PlanNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    /// Lists one page of plans, newest first.
    pub async fn list_dr_plans(&self, params: &ListDrPlans) -> Result<Vec<DrPlan>> {
        let params = params.clone();
        self.run_blocking(move |orchestrator| orchestrator.list_dr_plans(&params))
            .await
    }

    /// Applies a partial update and returns the plan with its changed fields.
    ///
    /// A blank cron expression leaves the schedule unchanged.
    pub async fn update_dr_plan(&self, params: &UpdateDrPlan) -> Result<(DrPlan, Vec<String>)> {
        let plan_id = params.id;
        let request = UpdateDrPlanRequest::try_from(params.clone())?;
        self.run_blocking(move |orchestrator| orchestrator.update_dr_plan(plan_id, &request))
            .await
    }

    /// Permanently deletes a plan. The deletion must be confirmed.
    pub async fn delete_dr_plan(&self, params: &DeleteDrPlan) -> Result<DrPlan> {
        if !params.confirmed {
            return Err(DrError::invalid_input("confirmed")
                .with_reason("Deleting a DR plan is permanent and must be confirmed"));
        }
        let plan_id = params.id;
        self.run_blocking(move |orchestrator| orchestrator.delete_dr_plan(plan_id))
            .await
    }

    /// DR configuration summary of an instance.
    pub async fn get_dr_status(&self, params: &InstanceId) -> Result<DrStatus> {
        let instance_id = params.instance_id;
        self.run_blocking(move |orchestrator| orchestrator.get_dr_status(instance_id))
            .await
    }

    pub async fn register_server(&self, params: &RegisterServer) -> Result<Server> {
        let params = params.clone();
        self.run_blocking(move |orchestrator| orchestrator.register_server(&params))
            .await
    }

    pub async fn register_instance(&self, params: &RegisterInstance) -> Result<Instance> {
        let params = params.clone();
        self.run_blocking(move |orchestrator| orchestrator.register_instance(&params))
            .await
    }

    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        self.run_blocking(|orchestrator| orchestrator.list_servers())
            .await
    }

    pub async fn list_instances(&self) -> Result<Vec<Instance>> {
        self.run_blocking(|orchestrator| orchestrator.list_instances())
            .await
    }

    /// Backups of an instance, newest first.
    pub async fn list_backups(&self, params: &InstanceId) -> Result<Vec<Backup>> {
        let instance_id = params.instance_id;
        self.run_blocking(move |orchestrator| orchestrator.list_backups(instance_id))
            .await
    }

    /// Active plans, as evaluated by the scheduler.
    pub(crate) async fn list_active_plans(&self) -> Result<Vec<DrPlan>> {
        self.run_blocking(|orchestrator| orchestrator.list_active_plans())
            .await
    }
}
