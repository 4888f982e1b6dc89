//! Core library for fleet disaster recovery.
//!
//! This crate owns DR plans (backup cadence, retention and failover target
//! per instance) and the pipelines that act on them: scheduled backups,
//! restore-to-server and self-verifying DR tests. Backup creation, artifact
//! transfer and provisioning are delegated to collaborators (see
//! [`pipeline`]); the crate sequences them, persists their outcomes in
//! SQLite and keeps the plan state consistent under partial failure.
//!
//! # Layers
//!
//! - [`cron`]: five-field cron evaluation with same-minute deduplication
//! - [`db`]: the SQLite plan store and fleet registry
//! - [`orchestrator`]: synchronous pipelines over one connection
//! - [`service`]: async facade with per-plan advisory locks
//! - [`scheduler`]: periodic backup dispatch and retention pruning
//! - [`display`]: markdown formatting for terminals and MCP clients
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fleetdr_core::{params::{CreateDrPlan, Id}, DrServiceBuilder, HookConfig};
//!
//! # async fn example(instance_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let service = DrServiceBuilder::new()
//!     .with_database_path(Some("fleet.db"))
//!     .with_hooks(HookConfig::load_default()?)
//!     .build()
//!     .await?;
//!
//! let plan = service
//!     .create_dr_plan(&CreateDrPlan::for_instance(instance_id))
//!     .await?;
//!
//! let result = service.test_dr(&Id { id: plan.id }).await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod cron;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod pipeline;
pub mod scheduler;
pub mod service;

// Re-export commonly used types
pub use db::Database;
pub use display::{CreateResult, DeleteResult, DrPlans, PruneResult, UpdateResult};
pub use error::{DrError, Result};
pub use models::{
    Backup, BackupStatus, DeployOutcome, DrPlan, DrPlanRecord, DrStatus, Instance, NewInstance,
    Server, TestStatus, UpdateDrPlanRequest,
};
pub use orchestrator::{DrTestResult, Orchestrator};
pub use params::{
    CreateDrPlan, DeleteDrPlan, Id, InstanceId, ListDrPlans, RegisterInstance, RegisterServer,
    RestoreToServer, UpdateDrPlan,
};
pub use pipeline::{
    BackupOperation, BackupTransfer, Collaborators, CommandHooks, HookConfig, ProvisioningPipeline,
};
pub use scheduler::{PruneReport, Scheduler, SchedulerConfig, TickReport};
pub use service::{DrService, DrServiceBuilder, QueuedTask};
