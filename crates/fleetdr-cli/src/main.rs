//! fdr: disaster recovery control plane CLI
//!
//! Plan management, fleet registry, pipeline runs and the backup scheduler
//! on the command line, plus an MCP server for AI assistants.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use fleetdr_core::{params::ListDrPlans, DrServiceBuilder, HookConfig};
use log::info;
use mcp::{run_stdio_server, FleetDrMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        hooks_file,
        no_color,
        command,
    } = Args::parse();

    let hooks = match hooks_file {
        Some(path) => HookConfig::load(path),
        None => HookConfig::load_default(),
    }
    .context("Failed to load collaborator hooks")?;

    let service = DrServiceBuilder::new()
        .with_database_path(database_file)
        .with_hooks(hooks)
        .build()
        .await
        .context("Failed to initialize DR service")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("fdr started");

    match command {
        Some(Plan { command }) => {
            Cli::new(service, renderer)
                .handle_plan_command(command)
                .await
        }
        Some(Fleet { command }) => {
            Cli::new(service, renderer)
                .handle_fleet_command(command)
                .await
        }
        Some(Dr { command }) => Cli::new(service, renderer).handle_dr_command(command).await,
        Some(Scheduler { command }) => {
            Cli::new(service, renderer)
                .handle_scheduler_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting fleetdr MCP server");
            run_stdio_server(FleetDrMcpServer::new(service))
                .await
                .context("MCP server failed")
        }
        None => {
            Cli::new(service, renderer)
                .list_plans(&ListDrPlans::default())
                .await
        }
    }
}
