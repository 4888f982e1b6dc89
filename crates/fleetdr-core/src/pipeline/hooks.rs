//! Collaborators backed by operator-configured shell commands.
//!
//! Each pipeline step maps to one optional command in a JSON hooks file:
//!
//! ```json
//! {
//!   "backup": "/opt/fleet/bin/backup.sh",
//!   "transfer": "/opt/fleet/bin/transfer.sh",
//!   "deploy": "/opt/fleet/bin/deploy.sh"
//! }
//! ```
//!
//! Commands run through `sh -c` with their inputs in `FLEETDR_*`
//! environment variables. Steps that produce a path (backup, transfer)
//! print it as the last non-empty line of stdout. A step without a
//! configured command fails with a configuration error naming the hook,
//! except `clear_deploy_secret`, which is skipped.

use std::{
    path::Path,
    process::{Command, Output},
};

use jiff::Timestamp;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BackupOperation, BackupTransfer, ProvisioningPipeline};
use crate::{
    error::{DrError, Result},
    models::{Backup, DeployOutcome, Instance, NewInstance, Server},
};

fn default_shell() -> String {
    "sh".to_string()
}

/// Shell commands for each pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookConfig {
    /// Interpreter invoked as `{shell} -c {command}`
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default)]
    pub backup: Option<String>,
    #[serde(default)]
    pub delete_backup: Option<String>,
    #[serde(default)]
    pub transfer: Option<String>,
    #[serde(default)]
    pub create_instance: Option<String>,
    #[serde(default)]
    pub deploy: Option<String>,
    #[serde(default)]
    pub clear_deploy_secret: Option<String>,
    #[serde(default)]
    pub restore_data: Option<String>,
    #[serde(default)]
    pub migrate: Option<String>,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            backup: None,
            delete_backup: None,
            transfer: None,
            create_instance: None,
            deploy: None,
            clear_deploy_secret: None,
            restore_data: None,
            migrate: None,
        }
    }
}

impl HookConfig {
    /// Reads a hooks file. A missing file yields an empty configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No hooks file at {}, pipeline hooks disabled", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| DrError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reads `$XDG_CONFIG_HOME/fleetdr/hooks.json` when it exists.
    pub fn load_default() -> Result<Self> {
        match xdg::BaseDirectories::with_prefix("fleetdr").find_config_file("hooks.json") {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Runs [`HookConfig`] commands as the DR collaborators.
#[derive(Debug, Clone)]
pub struct CommandHooks {
    config: HookConfig,
}

impl CommandHooks {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }

    fn command(&self, hook: &str, command: Option<&String>) -> Result<String> {
        command
            .cloned()
            .ok_or_else(|| DrError::configuration(format!("No '{hook}' hook configured")))
    }

    fn spawn(&self, hook: &str, command: &str, env: &[(&str, String)]) -> Result<Output> {
        // Values are not logged: the deploy hook receives the admin password
        debug!("Running '{hook}' hook");
        Command::new(&self.config.shell)
            .arg("-c")
            .arg(command)
            .envs(env.iter().map(|(key, value)| (*key, value.as_str())))
            .output()
            .map_err(|e| DrError::configuration(format!("Failed to run '{hook}' hook: {e}")))
    }

    /// Runs a hook and returns its stdout, failing on a non-zero exit.
    fn run(&self, hook: &str, command: &str, env: &[(&str, String)]) -> Result<String> {
        let output = self.spawn(hook, command, env)?;
        if !output.status.success() {
            return Err(DrError::pipeline(failure_message(hook, &output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn failure_message(hook: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.trim() {
        "" => format!("'{hook}' hook failed with {}", output.status),
        detail => format!("'{hook}' hook failed with {}: {detail}", output.status),
    }
}

/// The last non-empty line of a hook's stdout.
fn last_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(String::from)
}

fn instance_env(instance: &Instance) -> Vec<(&'static str, String)> {
    vec![
        ("FLEETDR_INSTANCE_ID", instance.id.to_string()),
        ("FLEETDR_SERVER_ID", instance.server_id.to_string()),
        ("FLEETDR_ORG_CODE", instance.org_code.clone()),
    ]
}

impl BackupOperation for CommandHooks {
    fn create_backup(&self, instance: &Instance) -> Result<Backup> {
        let command = self.command("backup", self.config.backup.as_ref())?;
        let output = self.spawn("backup", &command, &instance_env(instance))?;

        if !output.status.success() {
            return Ok(Backup::failed(
                instance.id,
                failure_message("backup", &output),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match last_line(&stdout) {
            Some(path) => {
                let mut backup = Backup::completed(instance.id, path, Timestamp::now());
                backup.size_bytes = backup
                    .file_path
                    .as_deref()
                    .and_then(|p| std::fs::metadata(p).ok())
                    .and_then(|meta| i64::try_from(meta.len()).ok());
                Ok(backup)
            }
            None => Ok(Backup::failed(
                instance.id,
                "'backup' hook produced no file path",
            )),
        }
    }

    fn delete_backup(&self, backup: &Backup) -> Result<()> {
        let command = self.command("delete_backup", self.config.delete_backup.as_ref())?;
        let env = [
            ("FLEETDR_BACKUP_ID", backup.id.to_string()),
            ("FLEETDR_INSTANCE_ID", backup.instance_id.to_string()),
            (
                "FLEETDR_BACKUP_PATH",
                backup.file_path.clone().unwrap_or_default(),
            ),
        ];
        self.run("delete_backup", &command, &env)?;
        Ok(())
    }
}

impl BackupTransfer for CommandHooks {
    fn transfer(&self, backup: &Backup, source: &Server, target: &Server) -> Result<String> {
        let command = self.command("transfer", self.config.transfer.as_ref())?;
        let env = [
            ("FLEETDR_BACKUP_ID", backup.id.to_string()),
            (
                "FLEETDR_BACKUP_PATH",
                backup.file_path.clone().unwrap_or_default(),
            ),
            ("FLEETDR_SOURCE_SERVER_ID", source.id.to_string()),
            ("FLEETDR_SOURCE_HOST", source.hostname.clone()),
            ("FLEETDR_TARGET_SERVER_ID", target.id.to_string()),
            ("FLEETDR_TARGET_HOST", target.hostname.clone()),
        ];
        let stdout = self.run("transfer", &command, &env)?;
        last_line(&stdout)
            .ok_or_else(|| DrError::pipeline("'transfer' hook produced no file path"))
    }
}

impl ProvisioningPipeline for CommandHooks {
    fn create_instance(&self, request: &NewInstance) -> Result<Instance> {
        let command = self.command("create_instance", self.config.create_instance.as_ref())?;
        let instance = Instance::from_new(request);

        let mut env = instance_env(&instance);
        env.push(("FLEETDR_ORG_NAME", instance.org_name.clone()));
        if let Some(ref framework) = instance.framework {
            env.push(("FLEETDR_FRAMEWORK", framework.clone()));
        }
        if let Some(ref currency) = instance.currency {
            env.push(("FLEETDR_CURRENCY", currency.clone()));
        }
        self.run("create_instance", &command, &env)?;

        Ok(instance)
    }

    fn deploy(
        &self,
        instance: &Instance,
        deployment_id: Uuid,
        admin_password: &str,
    ) -> Result<DeployOutcome> {
        let command = self.command("deploy", self.config.deploy.as_ref())?;
        let mut env = instance_env(instance);
        env.push(("FLEETDR_DEPLOYMENT_ID", deployment_id.to_string()));
        env.push(("FLEETDR_ADMIN_PASSWORD", admin_password.to_string()));

        let output = self.spawn("deploy", &command, &env)?;
        if output.status.success() {
            Ok(DeployOutcome::succeeded())
        } else {
            Ok(DeployOutcome::failed(failure_message("deploy", &output)))
        }
    }

    fn clear_deploy_secret(&self, instance_id: Uuid, deployment_id: Uuid) -> Result<()> {
        let Some(ref command) = self.config.clear_deploy_secret else {
            return Ok(());
        };
        let env = [
            ("FLEETDR_INSTANCE_ID", instance_id.to_string()),
            ("FLEETDR_DEPLOYMENT_ID", deployment_id.to_string()),
        ];
        self.run("clear_deploy_secret", command, &env)?;
        Ok(())
    }

    fn restore_data(&self, instance: &Instance, backup: &Backup) -> Result<()> {
        let command = self.command("restore_data", self.config.restore_data.as_ref())?;
        let mut env = instance_env(instance);
        env.push(("FLEETDR_BACKUP_ID", backup.id.to_string()));
        env.push((
            "FLEETDR_BACKUP_PATH",
            backup.file_path.clone().unwrap_or_default(),
        ));
        self.run("restore_data", &command, &env)?;
        Ok(())
    }

    fn migrate(&self, instance: &Instance) -> Result<()> {
        let command = self.command("migrate", self.config.migrate.as_ref())?;
        self.run("migrate", &command, &instance_env(instance))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn instance() -> Instance {
        Instance::from_new(&NewInstance {
            server_id: Uuid::new_v4(),
            org_code: "ACME".to_string(),
            org_name: "Acme".to_string(),
            ..Default::default()
        })
    }

    fn server(hostname: &str) -> Server {
        Server {
            id: Uuid::new_v4(),
            name: hostname.to_string(),
            hostname: hostname.to_string(),
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_missing_file_yields_empty_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = HookConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, HookConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "backup": "echo /tmp/b.tar" }}"#).unwrap();

        let config = HookConfig::load(file.path()).unwrap();
        assert_eq!(config.shell, "sh");
        assert_eq!(config.backup.as_deref(), Some("echo /tmp/b.tar"));
        assert!(config.deploy.is_none());
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            HookConfig::load(file.path()),
            Err(DrError::Serialization { .. })
        ));
    }

    #[test]
    fn test_backup_reads_last_stdout_line() {
        let hooks = CommandHooks::new(HookConfig {
            backup: Some("echo starting; echo \"/backups/$FLEETDR_ORG_CODE.tar\"; echo".to_string()),
            ..Default::default()
        });

        let backup = hooks.create_backup(&instance()).unwrap();
        assert!(backup.is_completed());
        assert_eq!(backup.file_path.as_deref(), Some("/backups/ACME.tar"));
        assert!(backup.completed_at.is_some());
    }

    #[test]
    fn test_backup_failure_is_reported_not_raised() {
        let hooks = CommandHooks::new(HookConfig {
            backup: Some("echo disk full >&2; exit 3".to_string()),
            ..Default::default()
        });

        let backup = hooks.create_backup(&instance()).unwrap();
        assert!(!backup.is_completed());
        assert!(backup.error_message.unwrap().contains("disk full"));
    }

    #[test]
    fn test_missing_hook_names_the_step() {
        let hooks = CommandHooks::new(HookConfig::default());
        let err = hooks.migrate(&instance()).unwrap_err();
        assert!(err.to_string().contains("'migrate'"));

        // Best-effort cleanup is skipped rather than failing
        assert!(hooks
            .clear_deploy_secret(Uuid::new_v4(), Uuid::new_v4())
            .is_ok());
    }

    #[test]
    fn test_transfer_receives_hosts() {
        let hooks = CommandHooks::new(HookConfig {
            transfer: Some("echo \"/srv/$FLEETDR_TARGET_HOST/copy\"".to_string()),
            ..Default::default()
        });
        let backup = Backup::completed(Uuid::new_v4(), "/srv/a/b.tar", Timestamp::now());

        let path = hooks
            .transfer(&backup, &server("alpha"), &server("beta"))
            .unwrap();
        assert_eq!(path, "/srv/beta/copy");
    }

    #[test]
    fn test_deploy_failure_becomes_outcome() {
        let hooks = CommandHooks::new(HookConfig {
            deploy: Some("test -n \"$FLEETDR_ADMIN_PASSWORD\" && exit 1".to_string()),
            ..Default::default()
        });

        let outcome = hooks
            .deploy(&instance(), Uuid::new_v4(), "s3cret")
            .unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("'deploy' hook failed"));
    }
}
