use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch database and hooks file per test.
struct TestEnv {
    _temp_dir: TempDir,
    db_path: PathBuf,
    hooks_path: PathBuf,
}

impl TestEnv {
    /// No hooks file: pipeline steps fail with a configuration error.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let db_path = temp_dir.path().join("cli_test.db");
        let hooks_path = temp_dir.path().join("hooks.json");
        Self {
            _temp_dir: temp_dir,
            db_path,
            hooks_path,
        }
    }

    /// Hooks that succeed at every step without touching anything.
    fn with_passing_hooks() -> Self {
        let env = Self::new();
        std::fs::write(
            &env.hooks_path,
            r#"{
                "backup": "echo /tmp/fleetdr-cli-test-$FLEETDR_ORG_CODE.tar.gz",
                "delete_backup": "true",
                "transfer": "echo /tmp/fleetdr-cli-test-incoming.tar.gz",
                "create_instance": "true",
                "deploy": "true",
                "clear_deploy_secret": "true",
                "restore_data": "true",
                "migrate": "true"
            }"#,
        )
        .expect("Failed to write hooks file");
        env
    }

    /// `fdr --no-color` against this environment's database and hooks.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("fdr").expect("Failed to find fdr binary");
        cmd.arg("--no-color")
            .arg("--database-file")
            .arg(&self.db_path)
            .arg("--hooks-file")
            .arg(&self.hooks_path);
        cmd
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self
            .cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(output).expect("Invalid UTF-8")
    }

    /// Registers a server, an instance on it and a plan targeting the same
    /// server. Returns (server_id, instance_id, plan_id).
    fn seed(&self) -> (String, String, String) {
        let server_id = extract_id(&self.run(&["fleet", "add-server", "primary", "10.0.0.1"]));
        let instance_id = extract_id(&self.run(&[
            "fleet",
            "add-instance",
            &server_id,
            "ACME",
            "Acme Corp",
            "--branch",
            "main",
            "--tag",
            "v2.4.1",
        ]));
        let plan_id = extract_id(&self.run(&[
            "plan",
            "create",
            &instance_id,
            "--target-server",
            &server_id,
        ]));
        (server_id, instance_id, plan_id)
    }
}

/// The id printed after "with ID: " by create commands.
fn extract_id(output: &str) -> String {
    output
        .lines()
        .find_map(|line| line.split_once("with ID: "))
        .map(|(_, id)| id.trim().to_string())
        .expect("Output should contain an ID")
}

#[test]
fn test_cli_help_lists_command_groups() {
    Command::cargo_bin("fdr")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("fleet"))
        .stdout(predicate::str::contains("scheduler"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_cli_list_empty_plans() {
    let env = TestEnv::new();

    env.cmd()
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No DR plans found."));
    assert!(env.db_path.exists());
}

#[test]
fn test_cli_default_command_lists_plans() {
    let env = TestEnv::new();

    env.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("No DR plans found."));
}

#[test]
fn test_cli_create_and_show_plan() {
    let env = TestEnv::new();
    let (server_id, instance_id, plan_id) = env.seed();

    env.cmd()
        .args(["plan", "show", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("# DR plan {plan_id}")))
        .stdout(predicate::str::contains(format!("- Instance: {instance_id}")))
        .stdout(predicate::str::contains("`0 2 * * *`"))
        .stdout(predicate::str::contains("- Retention: 30 days"))
        .stdout(predicate::str::contains(format!("- Target server: {server_id}")))
        .stdout(predicate::str::contains("Never tested."));

    env.cmd()
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# DR Plans"))
        .stdout(predicate::str::contains(&plan_id));
}

#[test]
fn test_cli_create_plan_rejects_bad_cron() {
    let env = TestEnv::new();
    let (_, instance_id, _) = env.seed();

    env.cmd()
        .args(["plan", "create", &instance_id, "--cron", "0 2 * *"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cron"));
}

#[test]
fn test_cli_create_plan_for_unknown_instance() {
    let env = TestEnv::new();

    env.cmd()
        .args(["plan", "create", "8c1f5f0e-9a55-4a51-9a0e-6f1f2b7a4c10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Instance not found"));
}

#[test]
fn test_cli_show_unknown_plan() {
    let env = TestEnv::new();

    env.cmd()
        .args(["plan", "show", "8c1f5f0e-9a55-4a51-9a0e-6f1f2b7a4c10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_update_plan_reports_changes() {
    let env = TestEnv::new();
    let (_, _, plan_id) = env.seed();

    env.cmd()
        .args([
            "plan",
            "update",
            &plan_id,
            "--cron",
            "15 4 * * 1-5",
            "--retention-days",
            "7",
            "--deactivate",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes made:"))
        .stdout(predicate::str::contains("- schedule: 15 4 * * 1-5"))
        .stdout(predicate::str::contains("- retention: 7 days"))
        .stdout(predicate::str::contains("- deactivated"));

    env.cmd()
        .args(["plan", "update", &plan_id, "--cron", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes made."));
}

#[test]
fn test_cli_delete_requires_confirmation() {
    let env = TestEnv::new();
    let (_, _, plan_id) = env.seed();

    env.cmd()
        .args(["plan", "delete", &plan_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confirmed"));

    env.cmd()
        .args(["plan", "delete", &plan_id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Deleted DR plan {plan_id}")));

    env.cmd()
        .args(["plan", "show", &plan_id])
        .assert()
        .failure();
}

#[test]
fn test_cli_status_of_instance() {
    let env = TestEnv::new();
    let server_id = extract_id(&env.run(&["fleet", "add-server", "primary", "10.0.0.1"]));
    let instance_id = extract_id(&env.run(&["fleet", "add-instance", &server_id, "ACME", "Acme"]));

    env.cmd()
        .args(["plan", "status", &instance_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));

    let plan_id = extract_id(&env.run(&["plan", "create", &instance_id]));
    env.cmd()
        .args(["plan", "status", &instance_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("configured (plan {plan_id})")))
        .stdout(predicate::str::contains("- Last test: never"));
}

#[test]
fn test_cli_fleet_listings() {
    let env = TestEnv::new();
    let (_, instance_id, _) = env.seed();

    env.cmd()
        .args(["fleet", "servers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**primary** `10.0.0.1`"));

    env.cmd()
        .args(["fleet", "instances"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## ACME"))
        .stdout(predicate::str::contains("- Release: main @ v2.4.1"));

    env.cmd()
        .args(["fleet", "backups", &instance_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found."));
}

#[test]
fn test_cli_duplicate_org_code_is_rejected() {
    let env = TestEnv::new();
    let (server_id, _, _) = env.seed();

    env.cmd()
        .args(["fleet", "add-instance", &server_id, "ACME", "Another Acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("org_code"));
}

#[test]
fn test_cli_backup_through_hooks() {
    let env = TestEnv::with_passing_hooks();
    let (_, instance_id, plan_id) = env.seed();

    env.cmd()
        .args(["dr", "backup", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"))
        .stdout(predicate::str::contains("/tmp/fleetdr-cli-test-ACME.tar.gz"));

    env.cmd()
        .args(["fleet", "backups", &instance_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));

    env.cmd()
        .args(["plan", "show", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Last backup: never").not());
}

#[test]
fn test_cli_dr_test_through_hooks() {
    let env = TestEnv::with_passing_hooks();
    let (_, _, plan_id) = env.seed();

    env.cmd()
        .args(["dr", "test", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("DR test passed"));

    env.cmd()
        .args(["plan", "show", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Passed"))
        .stdout(predicate::str::contains("Restored to DRTEST"));
}

#[test]
fn test_cli_dr_test_without_hooks_fails_and_is_recorded() {
    let env = TestEnv::new();
    let (_, _, plan_id) = env.seed();

    env.cmd()
        .args(["dr", "test", &plan_id])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No 'backup' hook configured"));

    env.cmd()
        .args(["plan", "show", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ Failed"))
        .stdout(predicate::str::contains("No 'backup' hook configured"));
}

#[test]
fn test_cli_restore_requires_completed_backup() {
    let env = TestEnv::with_passing_hooks();
    let (server_id, _, _) = env.seed();

    env.cmd()
        .args([
            "dr",
            "restore",
            "8c1f5f0e-9a55-4a51-9a0e-6f1f2b7a4c10",
            &server_id,
            "ACMEDR",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup not found or not completed"));
}

#[test]
fn test_cli_scheduler_tick_dispatches_due_plan() {
    let env = TestEnv::with_passing_hooks();
    let (_, instance_id, _) = env.seed();

    env.cmd()
        .args(["scheduler", "tick", "--at", "2025-06-15T02:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dispatched 1 backups"));

    env.cmd()
        .args(["scheduler", "tick", "--at", "2025-06-15T03:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dispatched 0 backups (1 not due, 0 busy)"));

    env.cmd()
        .args(["fleet", "backups", &instance_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed"));
}

#[test]
fn test_cli_scheduler_prune() {
    let env = TestEnv::with_passing_hooks();
    let (_, _, plan_id) = env.seed();

    env.run(&["dr", "backup", &plan_id]);

    env.cmd()
        .args(["scheduler", "prune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pruned 0 expired backups across 1 plans"));

    env.cmd()
        .args(["scheduler", "prune", "--at", "2999-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pruned 1 expired backups"));
}

#[test]
fn test_cli_dr_prune_names_plan() {
    let env = TestEnv::with_passing_hooks();
    let (_, _, plan_id) = env.seed();

    env.run(&["dr", "backup", &plan_id]);

    env.cmd()
        .args(["dr", "prune", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Pruned 0 expired backups of DR plan {plan_id}"
        )));
}
