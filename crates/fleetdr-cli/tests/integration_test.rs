//! CLI output is the core Display output, byte for byte, in plain mode.

use std::process::Command;

use fleetdr_core::{
    params::{CreateDrPlan, Id, InstanceId, RegisterInstance, RegisterServer},
    DrService, DrServiceBuilder, HookConfig,
};
use tempfile::TempDir;
use uuid::Uuid;

async fn create_test_service() -> (DrService, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let service = DrServiceBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_hooks(HookConfig::default())
        .build()
        .await
        .expect("Failed to create service");
    (service, temp_dir)
}

async fn seed_instance(service: &DrService) -> Uuid {
    let server = service
        .register_server(&RegisterServer {
            name: "primary".to_string(),
            hostname: "10.0.0.1".to_string(),
        })
        .await
        .unwrap();
    service
        .register_instance(&RegisterInstance {
            server_id: server.id,
            org_code: "ACME".to_string(),
            org_name: "Acme".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

/// Run a CLI command and capture its output
fn run_cli_command(temp_dir: &TempDir, args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_fdr"))
        .arg("--no-color")
        .arg("--database-file")
        .arg(temp_dir.path().join("test.db"))
        .arg("--hooks-file")
        .arg(temp_dir.path().join("hooks.json"))
        .args(args)
        .output()
        .expect("Failed to run CLI command");
    assert!(output.status.success(), "fdr {args:?} failed");
    String::from_utf8(output.stdout).expect("Invalid UTF-8 in CLI output")
}

#[tokio::test]
async fn test_plan_show_matches_display() {
    let (service, temp_dir) = create_test_service().await;
    let instance_id = seed_instance(&service).await;
    let plan = service
        .create_dr_plan(&CreateDrPlan::for_instance(instance_id))
        .await
        .unwrap();

    let cli_output = run_cli_command(&temp_dir, &["plan", "show", &plan.id.to_string()]);

    let stored = service
        .get_dr_plan(&Id { id: plan.id })
        .await
        .unwrap()
        .expect("Plan should exist");
    assert_eq!(cli_output, stored.to_string());
}

#[tokio::test]
async fn test_status_matches_display() {
    let (service, temp_dir) = create_test_service().await;
    let instance_id = seed_instance(&service).await;
    service
        .create_dr_plan(&CreateDrPlan::for_instance(instance_id))
        .await
        .unwrap();

    let cli_output = run_cli_command(&temp_dir, &["plan", "status", &instance_id.to_string()]);

    let status = service
        .get_dr_status(&InstanceId { instance_id })
        .await
        .unwrap();
    assert!(status.configured);
    assert_eq!(cli_output, status.to_string());
}
