//! DR orchestration over the plan store and the pipeline collaborators.
//!
//! [`Orchestrator`] is the synchronous core: it borrows an open
//! [`Database`] and a [`Collaborators`] set for the duration of one call and
//! keeps no state of its own. Every pipeline step runs strictly in order
//! because each step consumes the previous step's output.
//!
//! ```text
//! run_scheduled_backup ─▶ BackupOperation ─▶ plan.last_backup_at
//! restore_to_server    ─▶ create_instance ─▶ transfer ─▶ deploy ─▶ restore_data ─▶ migrate
//! test_dr              ─▶ backup ─▶ restore_to_server ─▶ plan.last_test_*
//! ```
//!
//! - [`plan_ops`]: plan CRUD, listings and status lookups
//! - [`fleet_ops`]: fleet registry writes used by the admin surfaces
//! - [`backup_ops`]: scheduled backups and retention pruning
//! - [`restore`]: the restore-to-server provisioning pipeline
//! - [`dr_test`]: self-verifying DR tests

use crate::{db::Database, pipeline::Collaborators};

pub mod backup_ops;
pub mod fleet_ops;
pub mod plan_ops;
pub mod restore;

pub use dr_test::DrTestResult;
pub use restore::{allocate_org_code, generate_admin_password, MAX_ORG_CODE_ATTEMPTS};

/// Runs DR operations against one database connection.
pub struct Orchestrator<'a> {
    db: &'a mut Database,
    collaborators: &'a Collaborators,
}

impl<'a> Orchestrator<'a> {
    pub fn new(db: &'a mut Database, collaborators: &'a Collaborators) -> Self {
        Self { db, collaborators }
    }
}
