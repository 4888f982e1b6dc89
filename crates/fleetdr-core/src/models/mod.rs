//! Data models for DR plans and the fleet entities they reference.
//!
//! Display implementations for these models live in
//! [`crate::display::models`], keeping presentation apart from the data.
//!
//! - [`DrPlan`]: backup cadence, retention and failover target for one
//!   instance, plus the outcome of its last backup and last DR test
//! - [`Server`], [`Instance`], [`Backup`]: fleet rows owned by the rest of the
//!   platform, mirrored here so pipelines can look them up and update them
//! - [`DrPlanRecord`] / [`DrStatus`]: transport-neutral serializations

pub mod dr_plan;
pub mod fleet;
pub mod record;
pub mod requests;
pub mod status;

pub use dr_plan::DrPlan;
pub use fleet::{Backup, DeployOutcome, Instance, NewInstance, Server};
pub use record::{DrPlanRecord, DrStatus};
pub use requests::UpdateDrPlanRequest;
pub use status::{BackupStatus, TestStatus};
