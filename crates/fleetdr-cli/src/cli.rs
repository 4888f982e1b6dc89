//! Command-line interface definitions and handlers.
//!
//! Argument structs carry the clap derives and convert into the core
//! parameter types, so the core stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → DrService
//! ```
//!
//! [`Cli`] runs each command against a [`DrService`] and renders the
//! markdown result through the [`TerminalRenderer`].

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use fleetdr_core::{
    display::{Backups, Instances, Servers},
    params::*,
    CreateResult, DeleteResult, DrPlans, DrService, PruneResult, Scheduler, SchedulerConfig,
    UpdateResult,
};
use jiff::Timestamp;
use log::{error, info};
use uuid::Uuid;

use crate::renderer::TerminalRenderer;

// ============================================================================
// Plan arguments
// ============================================================================

/// Create a DR plan for an instance
#[derive(Args)]
pub struct CreatePlanArgs {
    #[arg(help = "ID of the instance the plan protects")]
    pub instance_id: Uuid,
    #[arg(
        short,
        long,
        default_value = fleetdr_core::cron::DEFAULT_SCHEDULE,
        help = "Five-field cron expression for scheduled backups (UTC)"
    )]
    pub cron: String,
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_RETENTION_DAYS,
        help = "Days to keep backups before pruning"
    )]
    pub retention_days: u32,
    #[arg(
        short,
        long,
        help = "Server that DR tests and restores provision onto"
    )]
    pub target_server: Option<Uuid>,
}

impl From<CreatePlanArgs> for CreateDrPlan {
    fn from(val: CreatePlanArgs) -> Self {
        CreateDrPlan {
            instance_id: val.instance_id,
            backup_schedule_cron: val.cron,
            retention_days: val.retention_days,
            target_server_id: val.target_server,
        }
    }
}

/// List DR plans, newest first
#[derive(Args)]
pub struct ListPlansArgs {
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE, help = "Page size (max 200)")]
    pub limit: u32,
    #[arg(long, default_value_t = 0, help = "Number of plans to skip")]
    pub offset: u32,
    #[arg(long, help = "Only plans of instances owned by this organization")]
    pub organization: Option<Uuid>,
}

impl From<ListPlansArgs> for ListDrPlans {
    fn from(val: ListPlansArgs) -> Self {
        ListDrPlans {
            limit: val.limit,
            offset: val.offset,
            organization_id: val.organization,
        }
    }
}

/// Arguments addressing one DR plan
#[derive(Args)]
pub struct PlanIdArgs {
    #[arg(help = "ID of the DR plan")]
    pub id: Uuid,
}

impl From<PlanIdArgs> for Id {
    fn from(val: PlanIdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Show the DR status of an instance
#[derive(Args)]
pub struct StatusArgs {
    #[arg(help = "ID of the instance")]
    pub instance_id: Uuid,
}

impl From<StatusArgs> for InstanceId {
    fn from(val: StatusArgs) -> Self {
        InstanceId {
            instance_id: val.instance_id,
        }
    }
}

/// Update a DR plan; only the given options change
#[derive(Args)]
pub struct UpdatePlanArgs {
    #[arg(help = "ID of the DR plan to update")]
    pub id: Uuid,
    #[arg(short, long, help = "New cron expression; blank keeps the current one")]
    pub cron: Option<String>,
    #[arg(short, long, help = "New retention window in days")]
    pub retention_days: Option<u32>,
    #[arg(short, long, help = "New DR target server")]
    pub target_server: Option<Uuid>,
    #[arg(long, conflicts_with = "deactivate", help = "Resume scheduled backups")]
    pub activate: bool,
    #[arg(long, help = "Pause scheduled backups")]
    pub deactivate: bool,
}

impl From<UpdatePlanArgs> for UpdateDrPlan {
    fn from(val: UpdatePlanArgs) -> Self {
        let is_active = match (val.activate, val.deactivate) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        UpdateDrPlan {
            id: val.id,
            backup_schedule_cron: val.cron,
            retention_days: val.retention_days,
            target_server_id: val.target_server,
            is_active,
        }
    }
}

/// Permanently delete a DR plan
#[derive(Args)]
pub struct DeletePlanArgs {
    #[arg(help = "ID of the DR plan to delete")]
    pub id: Uuid,
    #[arg(short, long, help = "Confirm the deletion")]
    pub yes: bool,
}

impl From<DeletePlanArgs> for DeleteDrPlan {
    fn from(val: DeletePlanArgs) -> Self {
        DeleteDrPlan {
            id: val.id,
            confirmed: val.yes,
        }
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a DR plan for an instance
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List DR plans
    #[command(alias = "ls")]
    List(ListPlansArgs),
    /// Show details of a DR plan
    #[command(alias = "s")]
    Show(PlanIdArgs),
    /// Show whether an instance has disaster recovery configured
    Status(StatusArgs),
    /// Update a DR plan
    #[command(alias = "u")]
    Update(UpdatePlanArgs),
    /// Delete a DR plan
    Delete(DeletePlanArgs),
}

// ============================================================================
// Fleet arguments
// ============================================================================

/// Register a server
#[derive(Args)]
pub struct AddServerArgs {
    #[arg(help = "Display name of the server")]
    pub name: String,
    #[arg(help = "Hostname or address the hooks connect to")]
    pub hostname: String,
}

impl From<AddServerArgs> for RegisterServer {
    fn from(val: AddServerArgs) -> Self {
        RegisterServer {
            name: val.name,
            hostname: val.hostname,
        }
    }
}

/// Register an existing instance
#[derive(Args)]
pub struct AddInstanceArgs {
    #[arg(help = "ID of the server hosting the instance")]
    pub server_id: Uuid,
    #[arg(help = "Organization code, unique across the fleet")]
    pub org_code: String,
    #[arg(help = "Organization name")]
    pub org_name: String,
    #[arg(long, help = "Owning organization ID")]
    pub org_id: Option<Uuid>,
    #[arg(long)]
    pub sector_type: Option<String>,
    #[arg(long)]
    pub framework: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub admin_email: Option<String>,
    #[arg(long)]
    pub admin_username: Option<String>,
    #[arg(long, help = "Deployed git branch")]
    pub branch: Option<String>,
    #[arg(long, help = "Deployed git tag")]
    pub tag: Option<String>,
}

impl From<AddInstanceArgs> for RegisterInstance {
    fn from(val: AddInstanceArgs) -> Self {
        RegisterInstance {
            server_id: val.server_id,
            org_code: val.org_code,
            org_name: val.org_name,
            org_id: val.org_id,
            sector_type: val.sector_type,
            framework: val.framework,
            currency: val.currency,
            admin_email: val.admin_email,
            admin_username: val.admin_username,
            git_branch: val.branch,
            git_tag: val.tag,
        }
    }
}

#[derive(Subcommand)]
pub enum FleetCommands {
    /// Register a server
    AddServer(AddServerArgs),
    /// Register an existing instance
    AddInstance(AddInstanceArgs),
    /// List registered servers
    Servers,
    /// List registered instances
    Instances,
    /// List an instance's backups, newest first
    Backups(StatusArgs),
}

// ============================================================================
// Pipeline arguments
// ============================================================================

/// Restore a completed backup into a new instance
#[derive(Args)]
pub struct RestoreArgs {
    #[arg(help = "ID of a completed backup")]
    pub backup_id: Uuid,
    #[arg(help = "Server to provision the new instance on")]
    pub target_server_id: Uuid,
    #[arg(help = "Organization code of the new instance")]
    pub new_org_code: String,
    #[arg(short, long, help = "Organization name of the new instance")]
    pub name: Option<String>,
    #[arg(long, help = "Admin password; generated when omitted")]
    pub admin_password: Option<String>,
}

impl From<RestoreArgs> for RestoreToServer {
    fn from(val: RestoreArgs) -> Self {
        RestoreToServer {
            backup_id: val.backup_id,
            target_server_id: val.target_server_id,
            new_org_code: val.new_org_code,
            new_org_name: val.name,
            admin_password: val.admin_password,
        }
    }
}

#[derive(Subcommand)]
pub enum DrCommands {
    /// Back up a plan's instance now
    Backup(PlanIdArgs),
    /// Run a DR test of a plan now
    Test(PlanIdArgs),
    /// Restore a backup onto a server
    Restore(RestoreArgs),
    /// Delete a plan's backups older than its retention window
    Prune(PlanIdArgs),
}

// ============================================================================
// Scheduler arguments
// ============================================================================

/// Evaluate schedules at a given instant
#[derive(Args)]
pub struct AtArgs {
    #[arg(long, help = "Evaluate at this RFC 3339 instant instead of now")]
    pub at: Option<Timestamp>,
}

impl AtArgs {
    fn instant(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}

/// Run the scheduler until interrupted
#[derive(Args)]
pub struct RunArgs {
    #[arg(long, default_value_t = 60, help = "Seconds between backup checks")]
    pub tick_secs: u64,
    #[arg(long, default_value_t = 3600, help = "Seconds between prune runs")]
    pub prune_secs: u64,
}

impl From<RunArgs> for SchedulerConfig {
    fn from(val: RunArgs) -> Self {
        SchedulerConfig {
            tick_interval: Duration::from_secs(val.tick_secs.max(1)),
            prune_interval: Duration::from_secs(val.prune_secs.max(1)),
        }
    }
}

#[derive(Subcommand)]
pub enum SchedulerCommands {
    /// Queue backups for every due plan and wait for them
    Tick(AtArgs),
    /// Prune expired backups of every active plan
    Prune(AtArgs),
    /// Tick and prune periodically until Ctrl-C
    Run(RunArgs),
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs CLI commands against a [`DrService`].
pub struct Cli {
    service: DrService,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(service: DrService, renderer: TerminalRenderer) -> Self {
        Self { service, renderer }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let plan = self
                    .service
                    .create_dr_plan(&args.into())
                    .await
                    .context("Failed to create DR plan")?;
                self.renderer.render(&CreateResult::new(plan).to_string())
            }
            PlanCommands::List(args) => self.list_plans(&args.into()).await,
            PlanCommands::Show(args) => {
                let id: Id = args.into();
                let plan = self
                    .service
                    .get_dr_plan(&id)
                    .await
                    .context("Failed to get DR plan")?;
                match plan {
                    Some(plan) => self.renderer.render(&plan.to_string()),
                    None => bail!("DR plan {} not found", id.id),
                }
            }
            PlanCommands::Status(args) => {
                let status = self
                    .service
                    .get_dr_status(&args.into())
                    .await
                    .context("Failed to get DR status")?;
                self.renderer.render(&status.to_string())
            }
            PlanCommands::Update(args) => {
                let (plan, changes) = self
                    .service
                    .update_dr_plan(&args.into())
                    .await
                    .context("Failed to update DR plan")?;
                self.renderer
                    .render(&UpdateResult::with_changes(plan, changes).to_string())
            }
            PlanCommands::Delete(args) => {
                let plan = self
                    .service
                    .delete_dr_plan(&args.into())
                    .await
                    .context("Failed to delete DR plan")?;
                self.renderer.render(&DeleteResult::new(plan).to_string())
            }
        }
    }

    pub async fn list_plans(&self, params: &ListDrPlans) -> Result<()> {
        let plans = DrPlans(
            self.service
                .list_dr_plans(params)
                .await
                .context("Failed to list DR plans")?,
        );
        if plans.is_empty() {
            return self.renderer.render(&plans.to_string());
        }
        self.renderer.render(&format!("# DR Plans\n\n{plans}"))
    }

    pub async fn handle_fleet_command(&self, command: FleetCommands) -> Result<()> {
        match command {
            FleetCommands::AddServer(args) => {
                let server = self
                    .service
                    .register_server(&args.into())
                    .await
                    .context("Failed to register server")?;
                self.renderer.render(&CreateResult::new(server).to_string())
            }
            FleetCommands::AddInstance(args) => {
                let instance = self
                    .service
                    .register_instance(&args.into())
                    .await
                    .context("Failed to register instance")?;
                self.renderer.render(&CreateResult::new(instance).to_string())
            }
            FleetCommands::Servers => {
                let servers = self
                    .service
                    .list_servers()
                    .await
                    .context("Failed to list servers")?;
                self.renderer
                    .render(&format!("# Servers\n\n{}", Servers(servers)))
            }
            FleetCommands::Instances => {
                let instances = self
                    .service
                    .list_instances()
                    .await
                    .context("Failed to list instances")?;
                self.renderer
                    .render(&format!("# Instances\n\n{}", Instances(instances)))
            }
            FleetCommands::Backups(args) => {
                let backups = self
                    .service
                    .list_backups(&args.into())
                    .await
                    .context("Failed to list backups")?;
                self.renderer
                    .render(&format!("# Backups\n\n{}", Backups(backups)))
            }
        }
    }

    pub async fn handle_dr_command(&self, command: DrCommands) -> Result<()> {
        match command {
            DrCommands::Backup(args) => {
                let backup = self
                    .service
                    .run_scheduled_backup(&args.into())
                    .await
                    .context("Failed to run backup")?;
                self.renderer.render(&format!("# Backup\n\n{backup}"))?;
                if !backup.is_completed() {
                    bail!("Backup {} ended {}", backup.id, backup.status);
                }
                Ok(())
            }
            DrCommands::Test(args) => {
                let result = self
                    .service
                    .test_dr(&args.into())
                    .await
                    .context("Failed to run DR test")?;
                self.renderer.render(&result.to_string())?;
                if !result.success {
                    bail!("DR test failed");
                }
                Ok(())
            }
            DrCommands::Restore(args) => {
                let instance = self
                    .service
                    .restore_to_server(&args.into())
                    .await
                    .context("Failed to restore backup")?;
                self.renderer.render(&CreateResult::new(instance).to_string())
            }
            DrCommands::Prune(args) => {
                let params: Id = args.into();
                let pruned = self
                    .service
                    .prune_expired_backups(&params, Timestamp::now())
                    .await
                    .context("Failed to prune backups")?;
                self.renderer
                    .render(&PruneResult::new(params.id, pruned).to_string())
            }
        }
    }

    pub async fn handle_scheduler_command(&self, command: SchedulerCommands) -> Result<()> {
        let scheduler = Scheduler::new(self.service.clone());
        match command {
            SchedulerCommands::Tick(args) => {
                let report = scheduler
                    .tick_at(args.instant())
                    .await
                    .context("Failed to check schedules")?;
                let summary = report.to_string();
                report.wait().await;
                self.renderer.render(&summary)
            }
            SchedulerCommands::Prune(args) => {
                let report = scheduler
                    .prune_at(args.instant())
                    .await
                    .context("Failed to prune backups")?;
                self.renderer.render(&report.to_string())
            }
            SchedulerCommands::Run(args) => {
                info!("Starting scheduler");
                scheduler
                    .run(args.into(), async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            error!("Failed to listen for Ctrl-C: {e}");
                        }
                    })
                    .await
                    .context("Scheduler failed")
            }
        }
    }
}
