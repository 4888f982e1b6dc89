//! Database operations and SQLite management for DR plans and the fleet
//! registry.
//!
//! The store is a single SQLite file holding servers, instances, backups and
//! DR plans. Queries are split by area: [`plan_queries`] for the plan store,
//! [`fleet_queries`] for the registry rows the pipelines read and update.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod fleet_queries;
pub mod migrations;
pub mod plan_queries;
pub mod rows;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
