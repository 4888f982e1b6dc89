//! Display formatting for DR plans, fleet records and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes are wrapped in newtypes so the same
//! data can be rendered differently in lists, creations and updates. All
//! output is markdown, rendered by the CLI's terminal renderer or returned
//! verbatim over MCP.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrapper Types & │    │   Formatted     │
//! │ (DrPlan, Backup)│───▶│ Result Types    │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! - [`collections`]: collection wrappers (DrPlans, Backups, Servers, Instances)
//! - [`results`]: operation results (CreateResult, UpdateResult, DeleteResult)
//! - [`reports`]: scheduler tick and prune summaries (PruneResult)
//! - [`datetime`]: timestamp formatting
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use fleetdr_core::display::PruneResult;
//!
//! let result = PruneResult::new(uuid::Uuid::nil(), 2);
//! assert!(format!("{result}").starts_with("Pruned 2 expired backups"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod reports;
pub mod results;

pub use collections::{Backups, DrPlans, Instances, Servers};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use reports::PruneResult;
