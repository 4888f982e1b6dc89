//! MCP server for fleetdr
//!
//! Exposes plan management, status lookups and pipeline triggers to AI
//! assistants over the Model Context Protocol. Trigger tools queue a
//! background task on the server's runtime and answer `queued` with a task
//! id immediately; outcomes are read back through the plan's status.

use std::future::Future;

use anyhow::Result;
use fleetdr_core::DrService;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{
    CreateDrPlan, DeleteDrPlan, Id, InstanceId, ListDrPlans, McpHandlers, McpResult,
    RegisterInstance, RegisterServer, RestoreToServer, UpdateDrPlan,
};

/// MCP server for fleetdr
#[derive(Clone)]
pub struct FleetDrMcpServer {
    service: DrService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FleetDrMcpServer {
    pub fn new(service: DrService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> McpHandlers {
        McpHandlers::new(self.service.clone())
    }

    #[tool(
        name = "create_dr_plan",
        description = "Create a disaster recovery plan for an instance. Requires instance_id. Optional: backup_schedule_cron (five-field UTC cron, default '0 2 * * *'), retention_days (default 30) and target_server_id (server that DR tests and restores provision onto). The cron expression is validated before anything is stored."
    )]
    async fn create_dr_plan(&self, params: Parameters<CreateDrPlan>) -> McpResult {
        self.handlers().create_dr_plan(params).await
    }

    #[tool(
        name = "list_dr_plans",
        description = "List DR plans newest first. Optional: limit (default 50, max 200), offset, and organization_id to only list plans of that organization's instances."
    )]
    async fn list_dr_plans(&self, params: Parameters<ListDrPlans>) -> McpResult {
        self.handlers().list_dr_plans(params).await
    }

    #[tool(
        name = "show_dr_plan",
        description = "Show a DR plan: schedule, retention, target server, last backup time and the outcome of the last DR test."
    )]
    async fn show_dr_plan(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_dr_plan(params).await
    }

    #[tool(
        name = "update_dr_plan",
        description = "Update a DR plan. Only supplied fields change: backup_schedule_cron (a blank string keeps the current schedule), retention_days, target_server_id, is_active. Returns the plan and the list of changes."
    )]
    async fn update_dr_plan(&self, params: Parameters<UpdateDrPlan>) -> McpResult {
        self.handlers().update_dr_plan(params).await
    }

    #[tool(
        name = "delete_dr_plan",
        description = "Permanently delete a DR plan. Requires confirmed=true. Backups already taken are kept. Consider setting is_active=false with update_dr_plan to pause a plan instead."
    )]
    async fn delete_dr_plan(&self, params: Parameters<DeleteDrPlan>) -> McpResult {
        self.handlers().delete_dr_plan(params).await
    }

    #[tool(
        name = "get_dr_status",
        description = "Get the DR status of an instance as JSON: {configured: false}, or configured=true with the plan's fields (dr_plan_id, backup_schedule_cron, retention_days, target_server_id, is_active, last_backup_at, last_tested_at, last_test_status, last_test_message)."
    )]
    async fn get_dr_status(&self, params: Parameters<InstanceId>) -> McpResult {
        self.handlers().get_dr_status(params).await
    }

    #[tool(
        name = "list_backups",
        description = "List an instance's backups newest first with status, artifact path and error message."
    )]
    async fn list_backups(&self, params: Parameters<InstanceId>) -> McpResult {
        self.handlers().list_backups(params).await
    }

    #[tool(
        name = "register_server",
        description = "Register a server in the fleet registry by name and hostname. Returns the server ID to use as a DR target."
    )]
    async fn register_server(&self, params: Parameters<RegisterServer>) -> McpResult {
        self.handlers().register_server(params).await
    }

    #[tool(
        name = "register_instance",
        description = "Register an existing instance on a server. Requires server_id, org_code (unique across the fleet) and org_name; release (git_branch, git_tag) and organization details are optional."
    )]
    async fn register_instance(&self, params: Parameters<RegisterInstance>) -> McpResult {
        self.handlers().register_instance(params).await
    }

    #[tool(name = "list_servers", description = "List the registered servers.")]
    async fn list_servers(&self) -> McpResult {
        self.handlers().list_servers().await
    }

    #[tool(name = "list_instances", description = "List the registered instances.")]
    async fn list_instances(&self) -> McpResult {
        self.handlers().list_instances().await
    }

    #[tool(
        name = "trigger_backup",
        description = "Queue an immediate backup of a DR plan's instance. Returns {status: 'queued', task_id} right away; a completed backup advances the plan's last_backup_at. Fails if another pipeline of the plan is running."
    )]
    async fn trigger_backup(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().trigger_backup(params).await
    }

    #[tool(
        name = "trigger_test",
        description = "Queue a DR test of a plan: back up the instance and restore it onto the plan's target server under a throwaway DRTEST organization code. Returns {status: 'queued', task_id} right away; poll get_dr_status or show_dr_plan for last_test_status (running, then passed or failed)."
    )]
    async fn trigger_test(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().trigger_test(params).await
    }

    #[tool(
        name = "trigger_restore",
        description = "Queue a restore of a completed backup into a new instance on target_server_id with organization code new_org_code. Optional new_org_name (default 'Restore of <source name>') and admin_password (generated when omitted). Returns {status: 'queued', task_id} right away."
    )]
    async fn trigger_restore(&self, params: Parameters<RestoreToServer>) -> McpResult {
        self.handlers().trigger_restore(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for FleetDrMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fleetdr".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"fleetdr manages disaster recovery for a fleet of tenant instances.

## Core Concepts
- **DR plan**: one per instance; a cron backup schedule (UTC), a retention window in days and an optional target server
- **Backup**: produced by the plan's scheduled or triggered backups; only completed backups can be restored
- **DR test**: backs up the instance and restores it onto the target server under a throwaway DRTEST organization code

## Workflow
1. Register servers and instances with `register_server` and `register_instance`
2. Create a plan with `create_dr_plan`, setting `target_server_id` for DR tests
3. Run `trigger_test` and poll `get_dr_status` until `last_test_status` is passed or failed
4. Restore a backup into a new instance with `trigger_restore`

Trigger tools return immediately with a task id. Only one backup, test or prune runs per plan at a time."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: FleetDrMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting fleetdr MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
