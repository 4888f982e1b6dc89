//! Shared fixtures: a seeded database and stub collaborators that count
//! their calls.

#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use fleetdr_core::{
    Backup, BackupOperation, BackupStatus, BackupTransfer, Collaborators, Database, DeployOutcome,
    DrError, DrPlan, Instance, NewInstance, Orchestrator, ProvisioningPipeline, Result, Server,
};
use jiff::Timestamp;
use tempfile::TempDir;
use uuid::Uuid;

/// What the stub backup operation reports next.
#[derive(Debug, Clone)]
pub enum BackupScript {
    Completed { completed_at: Option<Timestamp> },
    Failed { error: Option<String> },
    Raise(String),
}

/// Call counters per collaborator method.
#[derive(Debug, Default)]
pub struct Calls {
    pub create_backup: AtomicUsize,
    pub delete_backup: AtomicUsize,
    pub transfer: AtomicUsize,
    pub create_instance: AtomicUsize,
    pub deploy: AtomicUsize,
    pub clear_deploy_secret: AtomicUsize,
    pub restore_data: AtomicUsize,
    pub migrate: AtomicUsize,
}

fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

impl Calls {
    pub fn create_backup(&self) -> usize {
        count(&self.create_backup)
    }
    pub fn delete_backup(&self) -> usize {
        count(&self.delete_backup)
    }
    pub fn transfer(&self) -> usize {
        count(&self.transfer)
    }
    pub fn create_instance(&self) -> usize {
        count(&self.create_instance)
    }
    pub fn deploy(&self) -> usize {
        count(&self.deploy)
    }
    pub fn clear_deploy_secret(&self) -> usize {
        count(&self.clear_deploy_secret)
    }
    pub fn restore_data(&self) -> usize {
        count(&self.restore_data)
    }
    pub fn migrate(&self) -> usize {
        count(&self.migrate)
    }

    /// Total collaborator calls of any kind.
    pub fn total(&self) -> usize {
        self.create_backup()
            + self.delete_backup()
            + self.transfer()
            + self.create_instance()
            + self.deploy()
            + self.clear_deploy_secret()
            + self.restore_data()
            + self.migrate()
    }
}

/// Scriptable stand-in for every collaborator.
#[derive(Debug)]
pub struct StubFleet {
    pub calls: Calls,
    pub backup: Mutex<BackupScript>,
    /// Id given to the next backup instead of a random one
    pub next_backup_id: Mutex<Option<Uuid>>,
    pub deploy: Mutex<DeployOutcome>,
    pub restore_error: Mutex<Option<String>>,
    pub delete_error: Mutex<Option<String>>,
    pub transferred_path: String,
    /// Admin passwords handed to deploy
    pub passwords: Mutex<Vec<String>>,
    /// Plan that `create_backup` reads through its own connection
    pub watched_plan: Mutex<Option<(PathBuf, Uuid)>>,
    /// The watched plan as stored when the backup started
    pub plan_at_backup: Mutex<Option<DrPlan>>,
}

impl Default for StubFleet {
    fn default() -> Self {
        Self {
            calls: Calls::default(),
            backup: Mutex::new(BackupScript::Completed { completed_at: None }),
            next_backup_id: Mutex::new(None),
            deploy: Mutex::new(DeployOutcome::succeeded()),
            restore_error: Mutex::new(None),
            delete_error: Mutex::new(None),
            transferred_path: "/incoming/transferred.tar.gz".to_string(),
            passwords: Mutex::new(Vec::new()),
            watched_plan: Mutex::new(None),
            plan_at_backup: Mutex::new(None),
        }
    }
}

impl StubFleet {
    pub fn script_backup(&self, script: BackupScript) {
        *self.backup.lock().unwrap() = script;
    }

    /// Snapshot `plan_id` from a separate connection when a backup starts.
    pub fn watch_plan(&self, db_path: PathBuf, plan_id: Uuid) {
        *self.watched_plan.lock().unwrap() = Some((db_path, plan_id));
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators::new(self.clone(), self.clone(), self.clone())
    }
}

impl BackupOperation for StubFleet {
    fn create_backup(&self, instance: &Instance) -> Result<Backup> {
        self.calls.create_backup.fetch_add(1, Ordering::SeqCst);
        if let Some((db_path, plan_id)) = self.watched_plan.lock().unwrap().clone() {
            let observer = Database::new(&db_path)?;
            *self.plan_at_backup.lock().unwrap() = observer.get_plan(plan_id)?;
        }
        let script = self.backup.lock().unwrap().clone();
        let mut backup = match script {
            BackupScript::Completed { completed_at } => {
                let at = completed_at.unwrap_or_else(Timestamp::now);
                let mut backup = Backup::completed(instance.id, "/var/backups/latest.tar.gz", at);
                backup.completed_at = completed_at;
                backup
            }
            BackupScript::Failed { error } => {
                let mut backup = Backup::failed(instance.id, "unused");
                backup.error_message = error;
                backup
            }
            BackupScript::Raise(message) => return Err(DrError::configuration(message)),
        };
        if let Some(id) = self.next_backup_id.lock().unwrap().take() {
            backup.id = id;
        }
        Ok(backup)
    }

    fn delete_backup(&self, _backup: &Backup) -> Result<()> {
        self.calls.delete_backup.fetch_add(1, Ordering::SeqCst);
        match self.delete_error.lock().unwrap().clone() {
            Some(message) => Err(DrError::pipeline(message)),
            None => Ok(()),
        }
    }
}

impl BackupTransfer for StubFleet {
    fn transfer(&self, _backup: &Backup, _source: &Server, _target: &Server) -> Result<String> {
        self.calls.transfer.fetch_add(1, Ordering::SeqCst);
        Ok(self.transferred_path.clone())
    }
}

impl ProvisioningPipeline for StubFleet {
    fn create_instance(&self, request: &NewInstance) -> Result<Instance> {
        self.calls.create_instance.fetch_add(1, Ordering::SeqCst);
        Ok(Instance::from_new(request))
    }

    fn deploy(
        &self,
        _instance: &Instance,
        _deployment_id: Uuid,
        admin_password: &str,
    ) -> Result<DeployOutcome> {
        self.calls.deploy.fetch_add(1, Ordering::SeqCst);
        self.passwords
            .lock()
            .unwrap()
            .push(admin_password.to_string());
        Ok(self.deploy.lock().unwrap().clone())
    }

    fn clear_deploy_secret(&self, _instance_id: Uuid, _deployment_id: Uuid) -> Result<()> {
        self.calls.clear_deploy_secret.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn restore_data(&self, _instance: &Instance, _backup: &Backup) -> Result<()> {
        self.calls.restore_data.fetch_add(1, Ordering::SeqCst);
        match self.restore_error.lock().unwrap().clone() {
            Some(message) => Err(DrError::pipeline(message)),
            None => Ok(()),
        }
    }

    fn migrate(&self, _instance: &Instance) -> Result<()> {
        self.calls.migrate.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A database seeded with two servers and one source instance on the first.
pub struct Fixture {
    _temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
    pub stub: Arc<StubFleet>,
    pub collaborators: Collaborators,
    pub primary: Server,
    pub standby: Server,
    pub instance: Instance,
    pub organization_id: Uuid,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("fleet.db");
        let db = Database::new(&db_path).expect("Failed to create test database");

        let primary = db.insert_server("primary", "primary.internal").unwrap();
        let standby = db.insert_server("standby", "standby.internal").unwrap();
        let organization_id = Uuid::new_v4();

        let mut instance = Instance::from_new(&NewInstance {
            server_id: primary.id,
            org_id: Some(organization_id),
            org_code: "ACME".to_string(),
            org_name: "Acme".to_string(),
            sector_type: Some("retail".to_string()),
            framework: Some("erp".to_string()),
            currency: Some("EUR".to_string()),
            admin_email: Some("admin@acme.test".to_string()),
            admin_username: Some("admin".to_string()),
            git_repo_id: Some(Uuid::new_v4()),
            catalog_item_id: Some(Uuid::new_v4()),
        });
        instance.subscription_plan_id = Some(Uuid::new_v4());
        instance.git_branch = Some("main".to_string());
        instance.git_tag = Some("v2.4.1".to_string());
        db.insert_instance(&instance).unwrap();

        let stub = Arc::new(StubFleet::default());
        let collaborators = stub.collaborators();

        Self {
            _temp_dir: temp_dir,
            db_path,
            db,
            stub,
            collaborators,
            primary,
            standby,
            instance,
            organization_id,
        }
    }

    pub fn orchestrator(&mut self) -> Orchestrator<'_> {
        Orchestrator::new(&mut self.db, &self.collaborators)
    }

    /// Stores a backup of the source instance with the given status.
    pub fn stored_backup(&self, status: BackupStatus) -> Backup {
        self.stored_backup_at(status, Timestamp::now())
    }

    /// Stores a backup of the source instance created at `created_at`.
    pub fn stored_backup_at(&self, status: BackupStatus, created_at: Timestamp) -> Backup {
        let mut backup =
            Backup::completed(self.instance.id, "/var/backups/acme.tar.gz", created_at);
        backup.status = status;
        backup.created_at = created_at;
        if status == BackupStatus::Failed {
            backup.file_path = None;
            backup.completed_at = None;
        }
        self.db.record_backup(&backup).unwrap();
        backup
    }

    /// Registers another instance on `server_id` with the given code.
    pub fn other_instance(&self, org_code: &str, organization_id: Option<Uuid>) -> Instance {
        let instance = Instance::from_new(&NewInstance {
            server_id: self.primary.id,
            org_id: organization_id,
            org_code: org_code.to_string(),
            org_name: org_code.to_string(),
            ..Default::default()
        });
        self.db.insert_instance(&instance).unwrap();
        instance
    }
}

/// Parses an RFC 3339 instant.
pub fn at(text: &str) -> Timestamp {
    text.parse().expect("valid timestamp")
}
