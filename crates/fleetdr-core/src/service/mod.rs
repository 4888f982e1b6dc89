//! Async facade over the DR orchestrator.
//!
//! [`DrService`] is what the CLI, the MCP server and the scheduler hold. It
//! is cheap to clone and keeps only the database path, the collaborator set
//! and the advisory lock registry; every call opens its own connection on
//! the blocking thread pool, so slow pipeline steps never block the async
//! runtime.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   DrService     │    │  Orchestrator   │    │    Database     │
//! │ (async, locks)  │───▶│ (sync pipelines)│───▶│   (via db/)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`builder`]: factory resolving the database path and collaborators
//! - [`plan_ops`]: plan CRUD, listings, status and fleet registry
//! - [`pipeline_ops`]: backups, restores, DR tests and prunes, inline or
//!   queued as background tasks
//! - [`locks`]: per-plan advisory locks

use std::{path::PathBuf, sync::Arc};

use tokio::task;

use crate::{
    db::Database,
    error::{DrError, Result},
    orchestrator::Orchestrator,
    pipeline::Collaborators,
};

pub mod builder;
pub mod locks;
pub mod pipeline_ops;
pub mod plan_ops;


pub use builder::DrServiceBuilder;
pub use locks::{PlanGuard, PlanLocks};
pub use pipeline_ops::QueuedTask;

/// Main entry point for DR plan management and pipeline runs.
#[derive(Clone)]
pub struct DrService {
    pub(crate) db_path: PathBuf,
    pub(crate) collaborators: Arc<Collaborators>,
    pub(crate) locks: PlanLocks,
}

impl DrService {
    pub(crate) fn new(db_path: PathBuf, collaborators: Collaborators) -> Self {
        Self {
            db_path,
            collaborators: Arc::new(collaborators),
            locks: PlanLocks::default(),
        }
    }

    /// The advisory lock registry shared by every clone of this service.
    pub fn locks(&self) -> &PlanLocks {
        &self.locks
    }

    /// Runs `op` against a fresh connection on the blocking pool.
    pub(crate) async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Orchestrator<'_>) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        let collaborators = Arc::clone(&self.collaborators);

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            let mut orchestrator = Orchestrator::new(&mut db, &collaborators);
            op(&mut orchestrator)
        })
        .await
        .map_err(|e| DrError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}

impl std::fmt::Debug for DrService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrService")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}
