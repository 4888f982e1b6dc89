use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{DrCommands, FleetCommands, PlanCommands, SchedulerCommands};

/// Disaster recovery control plane for a fleet of tenant instances
///
/// fdr keeps one DR plan per instance (backup schedule, retention window and
/// failover target), runs scheduled backups, restores backups onto other
/// servers and verifies plans with end-to-end DR tests. Pipeline steps run
/// through shell hooks configured in a JSON file. The same operations are
/// available to AI assistants through the MCP server mode.
#[derive(Parser)]
#[command(version, about, name = "fdr")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/fleetdr/fleetdr.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Path to the collaborator hooks file. Defaults to
    /// $XDG_CONFIG_HOME/fleetdr/hooks.json
    #[arg(long, global = true)]
    pub hooks_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the fdr CLI
///
/// - `plan`: DR plan management and per-instance status
/// - `fleet`: server and instance registry, backup listings
/// - `dr`: run backups, DR tests, restores and prunes now
/// - `scheduler`: scheduled backup dispatch and retention pruning
/// - `serve`: Start the MCP server
#[derive(Subcommand)]
pub enum Commands {
    /// Manage DR plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage the fleet registry
    #[command(alias = "f")]
    Fleet {
        #[command(subcommand)]
        command: FleetCommands,
    },
    /// Run DR pipelines
    Dr {
        #[command(subcommand)]
        command: DrCommands,
    },
    /// Run the backup scheduler
    Scheduler {
        #[command(subcommand)]
        command: SchedulerCommands,
    },
    /// Start the MCP server
    Serve,
}
