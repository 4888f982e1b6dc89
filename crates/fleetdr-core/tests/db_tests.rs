use fleetdr_core::{
    Backup, BackupStatus, Database, DrError, DrPlanRecord, Instance, NewInstance, Server,
    TestStatus, UpdateDrPlanRequest,
};
use jiff::Timestamp;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

/// Registers a server and an instance on it.
fn seed_instance(db: &Database, org_code: &str, org_id: Option<Uuid>) -> (Server, Instance) {
    let server = db
        .insert_server(&format!("{org_code}-host"), "10.0.0.1")
        .expect("Failed to insert server");
    let instance = Instance::from_new(&NewInstance {
        server_id: server.id,
        org_id,
        org_code: org_code.to_string(),
        org_name: format!("{org_code} Ltd"),
        ..Default::default()
    });
    db.insert_instance(&instance)
        .expect("Failed to insert instance");
    (server, instance)
}

#[test]
fn test_database_initialization() {
    let (temp_file, db) = create_test_db();

    assert!(temp_file.path().exists());
    assert!(db.list_plans(50, 0).unwrap().is_empty());
    assert!(db.list_servers().unwrap().is_empty());
}

#[test]
fn test_reopening_keeps_data() {
    let temp_file = NamedTempFile::new().unwrap();
    let plan_id = {
        let mut db = Database::new(temp_file.path()).unwrap();
        let (_, instance) = seed_instance(&db, "ACME", None);
        db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap().id
    };

    let db = Database::new(temp_file.path()).expect("Failed to reopen database");
    assert!(db.get_plan(plan_id).unwrap().is_some());
}

#[test]
fn test_create_and_get_plan() {
    let (_temp_file, mut db) = create_test_db();
    let (server, instance) = seed_instance(&db, "ACME", None);

    let plan = db
        .create_plan(instance.id, "30 1 * * 1-5", 14, Some(server.id))
        .expect("Failed to create plan");

    let retrieved = db
        .get_plan(plan.id)
        .expect("Failed to get plan")
        .expect("Plan should exist");

    assert_eq!(retrieved, plan);
    assert_eq!(retrieved.backup_schedule_cron, "30 1 * * 1-5");
    assert_eq!(retrieved.retention_days, 14);
    assert_eq!(retrieved.target_server_id, Some(server.id));
    assert!(retrieved.is_active);
    assert!(retrieved.last_backup_at.is_none());
}

#[test]
fn test_get_nonexistent_plan() {
    let (_temp_file, db) = create_test_db();
    assert!(db.get_plan(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_create_plan_for_unknown_instance_violates_foreign_key() {
    let (_temp_file, mut db) = create_test_db();

    let err = db
        .create_plan(Uuid::new_v4(), "0 2 * * *", 30, None)
        .unwrap_err();
    assert!(matches!(err, DrError::Database { .. }));
}

#[test]
fn test_list_plans_newest_first_with_paging() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);

    let ids: Vec<Uuid> = (0..3)
        .map(|_| db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap().id)
        .collect();

    let all = db.list_plans(50, 0).unwrap();
    let listed: Vec<Uuid> = all.iter().map(|p| p.id).collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);

    let page = db.list_plans(1, 1).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, ids[1]);
}

#[test]
fn test_list_plans_for_organization() {
    let (_temp_file, mut db) = create_test_db();
    let org = Uuid::new_v4();
    let (_, ours) = seed_instance(&db, "OURS", Some(org));
    let (_, theirs) = seed_instance(&db, "THEIRS", Some(Uuid::new_v4()));
    let (_, orphan) = seed_instance(&db, "ORPHAN", None);

    let own = db.create_plan(ours.id, "0 2 * * *", 30, None).unwrap();
    db.create_plan(theirs.id, "0 2 * * *", 30, None).unwrap();
    db.create_plan(orphan.id, "0 2 * * *", 30, None).unwrap();

    let plans = db.list_plans_for_organization(org, 50, 0).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].id, own.id);
}

#[test]
fn test_get_plan_for_instance_prefers_active() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);

    let older = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    let newer = db.create_plan(instance.id, "0 3 * * *", 30, None).unwrap();
    assert_eq!(
        db.get_plan_for_instance(instance.id).unwrap().unwrap().id,
        older.id
    );

    db.update_plan(
        older.id,
        &UpdateDrPlanRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(
        db.get_plan_for_instance(instance.id).unwrap().unwrap().id,
        newer.id
    );
    assert!(db.get_plan_for_instance(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_list_active_plans_excludes_inactive() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);

    let active = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    let paused = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    db.update_plan(
        paused.id,
        &UpdateDrPlanRequest {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();

    let plans = db.list_active_plans().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].id, active.id);
}

#[test]
fn test_update_plan_reports_changes() {
    let (_temp_file, mut db) = create_test_db();
    let (server, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();

    let (updated, changes) = db
        .update_plan(
            plan.id,
            &UpdateDrPlanRequest {
                backup_schedule_cron: Some("15 4 * * *".to_string()),
                retention_days: Some(30),
                target_server_id: Some(server.id),
                is_active: Some(false),
            },
        )
        .expect("Failed to update plan");

    assert_eq!(
        changes,
        vec![
            "schedule: 15 4 * * *".to_string(),
            format!("target server: {}", server.id),
            "deactivated".to_string(),
        ]
    );
    assert_eq!(updated.retention_days, 30);
    assert!(updated.updated_at >= plan.updated_at);
    assert_eq!(db.get_plan(plan.id).unwrap().unwrap(), updated);
}

#[test]
fn test_update_plan_without_changes() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();

    let (unchanged, changes) = db
        .update_plan(plan.id, &UpdateDrPlanRequest::default())
        .unwrap();

    assert!(changes.is_empty());
    assert_eq!(unchanged, plan);
}

#[test]
fn test_update_nonexistent_plan() {
    let (_temp_file, mut db) = create_test_db();

    let err = db
        .update_plan(Uuid::new_v4(), &UpdateDrPlanRequest::default())
        .unwrap_err();
    assert!(matches!(err, DrError::PlanNotFound { .. }));
}

#[test]
fn test_delete_plan() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();

    assert!(db.delete_plan(plan.id).unwrap());
    assert!(db.get_plan(plan.id).unwrap().is_none());
    assert!(!db.delete_plan(plan.id).unwrap());
}

#[test]
fn test_test_state_transitions() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    let tested_at: Timestamp = "2025-06-15T03:00:00Z".parse().unwrap();

    db.record_test_outcome(plan.id, TestStatus::Failed, "boom", tested_at)
        .unwrap();
    db.mark_test_running(plan.id).unwrap();

    let running = db.get_plan(plan.id).unwrap().unwrap();
    assert_eq!(running.last_test_status, Some(TestStatus::Running));
    assert_eq!(running.last_test_message, None);

    db.record_test_outcome(plan.id, TestStatus::Passed, "Restored to DRTEST0A1B2C", tested_at)
        .unwrap();
    let passed = db.get_plan(plan.id).unwrap().unwrap();
    assert_eq!(passed.last_test_status, Some(TestStatus::Passed));
    assert_eq!(
        passed.last_test_message.as_deref(),
        Some("Restored to DRTEST0A1B2C")
    );
    assert_eq!(passed.last_tested_at, Some(tested_at));

    assert!(matches!(
        db.mark_test_running(Uuid::new_v4()).unwrap_err(),
        DrError::PlanNotFound { .. }
    ));
}

#[test]
fn test_record_last_backup() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    let completed_at: Timestamp = "2025-06-15T02:04:10.5Z".parse().unwrap();

    db.record_last_backup(plan.id, completed_at).unwrap();

    assert_eq!(
        db.get_plan(plan.id).unwrap().unwrap().last_backup_at,
        Some(completed_at)
    );
}

#[test]
fn test_deleting_instance_cascades_to_plans_and_backups() {
    let (temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    let backup = Backup::completed(instance.id, "/b/acme.tar.gz", Timestamp::now());
    db.record_backup(&backup).unwrap();

    let raw = rusqlite::Connection::open(temp_file.path()).unwrap();
    raw.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    raw.execute(
        "DELETE FROM instances WHERE id = ?1",
        [instance.id.to_string()],
    )
    .unwrap();

    assert!(db.get_plan(plan.id).unwrap().is_none());
    assert!(db.get_backup(backup.id).unwrap().is_none());
}

#[test]
fn test_deleting_target_server_clears_plan_target() {
    let (temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let standby = db.insert_server("standby", "10.0.0.2").unwrap();
    let plan = db
        .create_plan(instance.id, "0 2 * * *", 30, Some(standby.id))
        .unwrap();

    let raw = rusqlite::Connection::open(temp_file.path()).unwrap();
    raw.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    raw.execute("DELETE FROM servers WHERE id = ?1", [standby.id.to_string()])
        .unwrap();

    let plan = db.get_plan(plan.id).unwrap().unwrap();
    assert_eq!(plan.target_server_id, None);
}

#[test]
fn test_server_and_instance_registry() {
    let (_temp_file, db) = create_test_db();
    let (server, instance) = seed_instance(&db, "ACME", None);

    assert_eq!(db.get_server(server.id).unwrap(), Some(server.clone()));
    assert_eq!(db.list_servers().unwrap(), vec![server]);
    assert_eq!(db.get_instance(instance.id).unwrap(), Some(instance.clone()));
    assert_eq!(db.list_instances().unwrap().len(), 1);

    assert!(db.org_code_exists("ACME").unwrap());
    assert!(!db.org_code_exists("acme").unwrap());
}

#[test]
fn test_duplicate_org_code_is_rejected() {
    let (_temp_file, db) = create_test_db();
    let (server, _) = seed_instance(&db, "ACME", None);

    let duplicate = Instance::from_new(&NewInstance {
        server_id: server.id,
        org_code: "ACME".to_string(),
        org_name: "Again".to_string(),
        ..Default::default()
    });
    assert!(matches!(
        db.insert_instance(&duplicate).unwrap_err(),
        DrError::Database { .. }
    ));
}

#[test]
fn test_assign_instance_release() {
    let (_temp_file, db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let subscription = Uuid::new_v4();

    db.assign_instance_release(instance.id, Some(subscription), Some("main"), Some("v1.2.0"))
        .unwrap();

    let stored = db.get_instance(instance.id).unwrap().unwrap();
    assert_eq!(stored.subscription_plan_id, Some(subscription));
    assert_eq!(stored.git_branch.as_deref(), Some("main"));
    assert_eq!(stored.git_tag.as_deref(), Some("v1.2.0"));

    assert!(matches!(
        db.assign_instance_release(Uuid::new_v4(), None, None, None)
            .unwrap_err(),
        DrError::InstanceNotFound { .. }
    ));
}

#[test]
fn test_record_backup_upserts_outcome() {
    let (_temp_file, db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);

    let mut backup = Backup::completed(instance.id, "/b/acme.tar.gz", Timestamp::now());
    backup.status = BackupStatus::Running;
    backup.completed_at = None;
    db.record_backup(&backup).unwrap();

    backup.status = BackupStatus::Completed;
    backup.size_bytes = Some(4096);
    backup.completed_at = Some(Timestamp::now());
    db.record_backup(&backup).unwrap();

    let stored = db.get_backup(backup.id).unwrap().unwrap();
    assert_eq!(stored, backup);
    assert!(stored.is_completed());
    assert_eq!(db.list_backups_for_instance(instance.id).unwrap().len(), 1);
}

#[test]
fn test_backup_listing_and_path_update() {
    let (_temp_file, db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);

    let mut older = Backup::completed(
        instance.id,
        "/b/older.tar.gz",
        "2025-06-13T02:05:00Z".parse().unwrap(),
    );
    older.created_at = "2025-06-13T02:00:00Z".parse().unwrap();
    let mut newer = Backup::failed(instance.id, "pg_dump exited with 1");
    newer.created_at = "2025-06-14T02:00:00Z".parse().unwrap();
    db.record_backup(&older).unwrap();
    db.record_backup(&newer).unwrap();

    let listed: Vec<Uuid> = db
        .list_backups_for_instance(instance.id)
        .unwrap()
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(listed, vec![newer.id, older.id]);

    db.update_backup_file_path(older.id, "/incoming/older.tar.gz")
        .unwrap();
    assert_eq!(
        db.get_backup(older.id).unwrap().unwrap().file_path.as_deref(),
        Some("/incoming/older.tar.gz")
    );
    assert!(matches!(
        db.update_backup_file_path(Uuid::new_v4(), "/x").unwrap_err(),
        DrError::BackupNotFound { .. }
    ));

    assert!(db.delete_backup(newer.id).unwrap());
    assert!(!db.delete_backup(newer.id).unwrap());
}

#[test]
fn test_plan_record_serialization() {
    let (_temp_file, mut db) = create_test_db();
    let (_, instance) = seed_instance(&db, "ACME", None);
    let plan = db.create_plan(instance.id, "0 2 * * *", 30, None).unwrap();
    db.record_test_outcome(
        plan.id,
        TestStatus::Passed,
        "Restored to DRTESTAAAAAA",
        "2025-06-15T03:00:00Z".parse().unwrap(),
    )
    .unwrap();
    let plan = db.get_plan(plan.id).unwrap().unwrap();

    let json = serde_json::to_value(DrPlanRecord::from(&plan)).unwrap();

    assert_eq!(json["dr_plan_id"], plan.id.to_string());
    assert_eq!(json["instance_id"], instance.id.to_string());
    assert_eq!(json["retention_days"], 30);
    assert_eq!(json["target_server_id"], serde_json::Value::Null);
    assert_eq!(json["last_backup_at"], serde_json::Value::Null);
    assert_eq!(json["last_test_status"], "passed");
    assert_eq!(json["last_tested_at"], "2025-06-15T03:00:00Z");
}
