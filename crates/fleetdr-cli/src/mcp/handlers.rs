//! MCP tool handlers implementation

use fleetdr_core::{
    display::{Backups, Instances, Servers},
    params as core, CreateResult, DeleteResult, DrError, DrPlans, DrService, QueuedTask,
    UpdateResult,
};
use log::debug;
use rmcp::{
    handler::server::tool::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::errors::to_mcp_error;

/// Generic MCP wrapper for core parameter types
///
/// `#[serde(transparent)]` passes deserialization straight through to the
/// wrapped core type, and the schema is the core type's own, so the core
/// parameter structs stay the single definition of every tool's input.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type InstanceId = McpParams<core::InstanceId>;
pub type CreateDrPlan = McpParams<core::CreateDrPlan>;
pub type UpdateDrPlan = McpParams<core::UpdateDrPlan>;
pub type DeleteDrPlan = McpParams<core::DeleteDrPlan>;
pub type ListDrPlans = McpParams<core::ListDrPlans>;
pub type RestoreToServer = McpParams<core::RestoreToServer>;
pub type RegisterServer = McpParams<core::RegisterServer>;
pub type RegisterInstance = McpParams<core::RegisterInstance>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(body: impl Into<String>) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(body.into())]))
}

/// Answer of the trigger tools: the task is queued, not finished.
fn queued(task: &QueuedTask, subject: serde_json::Value) -> McpResult {
    let mut body = json!({
        "status": "queued",
        "task_id": task.task_id.to_string(),
    });
    if let (Some(body), Some(subject)) = (body.as_object_mut(), subject.as_object()) {
        body.extend(subject.clone());
    }
    text(body.to_string())
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    service: DrService,
}

impl McpHandlers {
    pub fn new(service: DrService) -> Self {
        Self { service }
    }

    pub async fn create_dr_plan(&self, Parameters(params): Parameters<CreateDrPlan>) -> McpResult {
        debug!("create_dr_plan: {params:?}");

        let plan = self
            .service
            .create_dr_plan(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create DR plan", &e))?;

        text(CreateResult::new(plan).to_string())
    }

    pub async fn list_dr_plans(&self, Parameters(params): Parameters<ListDrPlans>) -> McpResult {
        debug!("list_dr_plans: {params:?}");

        let plans = DrPlans(
            self.service
                .list_dr_plans(params.as_ref())
                .await
                .map_err(|e| to_mcp_error("Failed to list DR plans", &e))?,
        );

        if plans.is_empty() {
            return text(plans.to_string());
        }
        text(format!("# DR Plans\n\n{plans}"))
    }

    pub async fn show_dr_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_dr_plan: {params:?}");

        let id = params.as_ref().id;
        let plan = self
            .service
            .get_dr_plan(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get DR plan", &e))?
            .ok_or_else(|| to_mcp_error("Failed to get DR plan", &DrError::PlanNotFound { id }))?;

        text(plan.to_string())
    }

    pub async fn update_dr_plan(&self, Parameters(params): Parameters<UpdateDrPlan>) -> McpResult {
        debug!("update_dr_plan: {params:?}");

        let (plan, changes) = self
            .service
            .update_dr_plan(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update DR plan", &e))?;

        text(UpdateResult::with_changes(plan, changes).to_string())
    }

    pub async fn delete_dr_plan(&self, Parameters(params): Parameters<DeleteDrPlan>) -> McpResult {
        debug!("delete_dr_plan: {params:?}");

        let plan = self
            .service
            .delete_dr_plan(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete DR plan", &e))?;

        text(DeleteResult::new(plan).to_string())
    }

    /// Returns the status record as JSON.
    pub async fn get_dr_status(&self, Parameters(params): Parameters<InstanceId>) -> McpResult {
        debug!("get_dr_status: {params:?}");

        let status = self
            .service
            .get_dr_status(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get DR status", &e))?;
        let body = serde_json::to_string_pretty(&status)
            .map_err(|e| to_mcp_error("Failed to encode DR status", &e.into()))?;

        text(body)
    }

    pub async fn list_backups(&self, Parameters(params): Parameters<InstanceId>) -> McpResult {
        debug!("list_backups: {params:?}");

        let backups = self
            .service
            .list_backups(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list backups", &e))?;

        text(format!("# Backups\n\n{}", Backups(backups)))
    }

    pub async fn register_server(&self, Parameters(params): Parameters<RegisterServer>) -> McpResult {
        debug!("register_server: {params:?}");

        let server = self
            .service
            .register_server(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to register server", &e))?;

        text(CreateResult::new(server).to_string())
    }

    pub async fn register_instance(
        &self,
        Parameters(params): Parameters<RegisterInstance>,
    ) -> McpResult {
        debug!("register_instance: {params:?}");

        let instance = self
            .service
            .register_instance(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to register instance", &e))?;

        text(CreateResult::new(instance).to_string())
    }

    pub async fn list_servers(&self) -> McpResult {
        let servers = self
            .service
            .list_servers()
            .await
            .map_err(|e| to_mcp_error("Failed to list servers", &e))?;

        text(format!("# Servers\n\n{}", Servers(servers)))
    }

    pub async fn list_instances(&self) -> McpResult {
        let instances = self
            .service
            .list_instances()
            .await
            .map_err(|e| to_mcp_error("Failed to list instances", &e))?;

        text(format!("# Instances\n\n{}", Instances(instances)))
    }

    pub async fn trigger_backup(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("trigger_backup: {params:?}");

        let plan_id = self.queueable_plan(params.as_ref()).await?;
        let task = self.service.enqueue_backup(plan_id);
        queued(&task, json!({ "dr_plan_id": plan_id.to_string() }))
    }

    pub async fn trigger_test(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("trigger_test: {params:?}");

        let plan_id = self.queueable_plan(params.as_ref()).await?;
        let task = self.service.enqueue_test(plan_id);
        queued(&task, json!({ "dr_plan_id": plan_id.to_string() }))
    }

    pub async fn trigger_restore(
        &self,
        Parameters(params): Parameters<RestoreToServer>,
    ) -> McpResult {
        debug!(
            "trigger_restore: backup {} to server {}",
            params.as_ref().backup_id,
            params.as_ref().target_server_id
        );

        let request = params.as_ref().clone();
        let backup_id = request.backup_id;
        let task = self.service.enqueue_restore(request);
        queued(&task, json!({ "backup_id": backup_id.to_string() }))
    }

    /// Checks that the plan exists and no pipeline holds it.
    async fn queueable_plan(&self, params: &core::Id) -> Result<Uuid, ErrorData> {
        let id = params.id;
        let context = "Failed to queue pipeline";
        self.service
            .get_dr_plan(params)
            .await
            .map_err(|e| to_mcp_error(context, &e))?
            .ok_or_else(|| to_mcp_error(context, &DrError::PlanNotFound { id }))?;
        if self.service.locks().is_held(id) {
            return Err(to_mcp_error(context, &DrError::PlanBusy { id }));
        }
        Ok(id)
    }
}
