//! Fleet registry queries: servers, instances and backups.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::rows;
use crate::{
    error::{DatabaseResultExt, DrError, Result},
    models::{Backup, Instance, Server},
};

const INSERT_SERVER_SQL: &str =
    "INSERT INTO servers (id, name, hostname, created_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_SERVER_SQL: &str = "SELECT id, name, hostname, created_at FROM servers WHERE id = ?1";
const LIST_SERVERS_SQL: &str = "SELECT id, name, hostname, created_at FROM servers ORDER BY name";

const INSTANCE_COLUMNS: &str = "id, server_id, org_id, org_code, org_name, sector_type, framework, \
     currency, admin_email, admin_username, git_repo_id, catalog_item_id, subscription_plan_id, \
     git_branch, git_tag, created_at";
const INSERT_INSTANCE_SQL: &str = "INSERT INTO instances (id, server_id, org_id, org_code, org_name, sector_type, framework, currency, admin_email, admin_username, git_repo_id, catalog_item_id, subscription_plan_id, git_branch, git_tag, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";
const CHECK_ORG_CODE_SQL: &str = "SELECT EXISTS(SELECT 1 FROM instances WHERE org_code = ?1)";
const ASSIGN_RELEASE_SQL: &str =
    "UPDATE instances SET subscription_plan_id = ?1, git_branch = ?2, git_tag = ?3 WHERE id = ?4";

const BACKUP_COLUMNS: &str =
    "id, instance_id, status, file_path, size_bytes, error_message, created_at, completed_at";
const UPSERT_BACKUP_SQL: &str = "INSERT INTO backups (id, instance_id, status, file_path, size_bytes, error_message, created_at, completed_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
     ON CONFLICT(id) DO UPDATE SET status = excluded.status, file_path = excluded.file_path, \
     size_bytes = excluded.size_bytes, error_message = excluded.error_message, \
     completed_at = excluded.completed_at";
const UPDATE_BACKUP_PATH_SQL: &str = "UPDATE backups SET file_path = ?1 WHERE id = ?2";
const DELETE_BACKUP_SQL: &str = "DELETE FROM backups WHERE id = ?1";

fn server_from_row(row: &Row<'_>) -> rusqlite::Result<Server> {
    Ok(Server {
        id: rows::uuid(row, 0)?,
        name: row.get(1)?,
        hostname: row.get(2)?,
        created_at: rows::timestamp(row, 3)?,
    })
}

fn instance_from_row(row: &Row<'_>) -> rusqlite::Result<Instance> {
    Ok(Instance {
        id: rows::uuid(row, 0)?,
        server_id: rows::uuid(row, 1)?,
        org_id: rows::opt_uuid(row, 2)?,
        org_code: row.get(3)?,
        org_name: row.get(4)?,
        sector_type: row.get(5)?,
        framework: row.get(6)?,
        currency: row.get(7)?,
        admin_email: row.get(8)?,
        admin_username: row.get(9)?,
        git_repo_id: rows::opt_uuid(row, 10)?,
        catalog_item_id: rows::opt_uuid(row, 11)?,
        subscription_plan_id: rows::opt_uuid(row, 12)?,
        git_branch: row.get(13)?,
        git_tag: row.get(14)?,
        created_at: rows::timestamp(row, 15)?,
    })
}

fn backup_from_row(row: &Row<'_>) -> rusqlite::Result<Backup> {
    Ok(Backup {
        id: rows::uuid(row, 0)?,
        instance_id: rows::uuid(row, 1)?,
        status: rows::parsed(row, 2)?,
        file_path: row.get(3)?,
        size_bytes: row.get(4)?,
        error_message: row.get(5)?,
        created_at: rows::timestamp(row, 6)?,
        completed_at: rows::opt_timestamp(row, 7)?,
    })
}

impl super::Database {
    /// Registers a server.
    pub fn insert_server(&self, name: &str, hostname: &str) -> Result<Server> {
        let server = Server {
            id: Uuid::new_v4(),
            name: name.to_string(),
            hostname: hostname.to_string(),
            created_at: Timestamp::now(),
        };

        self.connection
            .execute(
                INSERT_SERVER_SQL,
                params![
                    server.id.to_string(),
                    &server.name,
                    &server.hostname,
                    rows::timestamp_text(server.created_at)
                ],
            )
            .db_context("Failed to insert server")?;

        Ok(server)
    }

    pub fn get_server(&self, id: Uuid) -> Result<Option<Server>> {
        self.connection
            .query_row(SELECT_SERVER_SQL, params![id.to_string()], server_from_row)
            .optional()
            .db_context("Failed to query server")
    }

    pub fn list_servers(&self) -> Result<Vec<Server>> {
        let mut stmt = self
            .connection
            .prepare(LIST_SERVERS_SQL)
            .db_context("Failed to prepare query")?;

        let servers = stmt
            .query_map([], server_from_row)
            .db_context("Failed to query servers")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch servers")?;
        Ok(servers)
    }

    /// Stores an instance record, release fields included.
    pub fn insert_instance(&self, instance: &Instance) -> Result<()> {
        self.connection
            .execute(
                INSERT_INSTANCE_SQL,
                params![
                    instance.id.to_string(),
                    instance.server_id.to_string(),
                    rows::opt_uuid_text(instance.org_id),
                    &instance.org_code,
                    &instance.org_name,
                    &instance.sector_type,
                    &instance.framework,
                    &instance.currency,
                    &instance.admin_email,
                    &instance.admin_username,
                    rows::opt_uuid_text(instance.git_repo_id),
                    rows::opt_uuid_text(instance.catalog_item_id),
                    rows::opt_uuid_text(instance.subscription_plan_id),
                    &instance.git_branch,
                    &instance.git_tag,
                    rows::timestamp_text(instance.created_at),
                ],
            )
            .db_context("Failed to insert instance")?;
        Ok(())
    }

    pub fn get_instance(&self, id: Uuid) -> Result<Option<Instance>> {
        let sql = format!("SELECT {INSTANCE_COLUMNS} FROM instances WHERE id = ?1");
        self.connection
            .query_row(&sql, params![id.to_string()], instance_from_row)
            .optional()
            .db_context("Failed to query instance")
    }

    pub fn list_instances(&self) -> Result<Vec<Instance>> {
        let sql = format!("SELECT {INSTANCE_COLUMNS} FROM instances ORDER BY org_code");
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let instances = stmt
            .query_map([], instance_from_row)
            .db_context("Failed to query instances")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch instances")?;
        Ok(instances)
    }

    /// True when some instance already uses `org_code`.
    pub fn org_code_exists(&self, org_code: &str) -> Result<bool> {
        self.connection
            .query_row(CHECK_ORG_CODE_SQL, params![org_code], |row| row.get(0))
            .db_context("Failed to check organization code")
    }

    /// Second phase of instance construction: subscription plan and release.
    pub fn assign_instance_release(
        &self,
        id: Uuid,
        subscription_plan_id: Option<Uuid>,
        git_branch: Option<&str>,
        git_tag: Option<&str>,
    ) -> Result<()> {
        let updated = self
            .connection
            .execute(
                ASSIGN_RELEASE_SQL,
                params![
                    rows::opt_uuid_text(subscription_plan_id),
                    git_branch,
                    git_tag,
                    id.to_string()
                ],
            )
            .db_context("Failed to assign instance release")?;
        if updated == 0 {
            return Err(DrError::InstanceNotFound { id });
        }
        Ok(())
    }

    /// Inserts a backup or refreshes its outcome columns.
    pub fn record_backup(&self, backup: &Backup) -> Result<()> {
        self.connection
            .execute(
                UPSERT_BACKUP_SQL,
                params![
                    backup.id.to_string(),
                    backup.instance_id.to_string(),
                    backup.status.as_str(),
                    &backup.file_path,
                    backup.size_bytes,
                    &backup.error_message,
                    rows::timestamp_text(backup.created_at),
                    rows::opt_timestamp_text(backup.completed_at),
                ],
            )
            .db_context("Failed to record backup")?;
        Ok(())
    }

    pub fn get_backup(&self, id: Uuid) -> Result<Option<Backup>> {
        let sql = format!("SELECT {BACKUP_COLUMNS} FROM backups WHERE id = ?1");
        self.connection
            .query_row(&sql, params![id.to_string()], backup_from_row)
            .optional()
            .db_context("Failed to query backup")
    }

    /// Points a backup at its transferred location.
    pub fn update_backup_file_path(&self, id: Uuid, file_path: &str) -> Result<()> {
        let updated = self
            .connection
            .execute(UPDATE_BACKUP_PATH_SQL, params![file_path, id.to_string()])
            .db_context("Failed to update backup file path")?;
        if updated == 0 {
            return Err(DrError::BackupNotFound { id });
        }
        Ok(())
    }

    /// Lists an instance's backups, newest first.
    pub fn list_backups_for_instance(&self, instance_id: Uuid) -> Result<Vec<Backup>> {
        let sql = format!(
            "SELECT {BACKUP_COLUMNS} FROM backups WHERE instance_id = ?1 ORDER BY created_at DESC"
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;

        let backups = stmt
            .query_map(params![instance_id.to_string()], backup_from_row)
            .db_context("Failed to query backups")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch backups")?;
        Ok(backups)
    }

    /// Deletes a backup row. Returns false when no such backup existed.
    pub fn delete_backup(&self, id: Uuid) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_BACKUP_SQL, params![id.to_string()])
            .db_context("Failed to delete backup")?;
        Ok(deleted > 0)
    }
}
