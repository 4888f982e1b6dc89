//! DR plan CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::rows;
use crate::{
    error::{DatabaseResultExt, DrError, Result},
    models::{DrPlan, TestStatus, UpdateDrPlanRequest},
};

const PLAN_COLUMNS: &str = "p.id, p.instance_id, p.backup_schedule_cron, p.retention_days, \
     p.target_server_id, p.last_backup_at, p.last_tested_at, p.last_test_status, \
     p.last_test_message, p.is_active, p.created_at, p.updated_at";

const INSERT_PLAN_SQL: &str = "INSERT INTO dr_plans (id, instance_id, backup_schedule_cron, retention_days, target_server_id, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)";
const UPDATE_PLAN_SQL: &str = "UPDATE dr_plans SET backup_schedule_cron = ?1, retention_days = ?2, target_server_id = ?3, is_active = ?4, updated_at = ?5 WHERE id = ?6";
const DELETE_PLAN_SQL: &str = "DELETE FROM dr_plans WHERE id = ?1";
const MARK_TEST_RUNNING_SQL: &str = "UPDATE dr_plans SET last_test_status = 'running', last_test_message = NULL, updated_at = ?1 WHERE id = ?2";
const RECORD_TEST_OUTCOME_SQL: &str = "UPDATE dr_plans SET last_test_status = ?1, last_test_message = ?2, last_tested_at = ?3, updated_at = ?3 WHERE id = ?4";
const RECORD_LAST_BACKUP_SQL: &str =
    "UPDATE dr_plans SET last_backup_at = ?1, updated_at = ?2 WHERE id = ?3";

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<DrPlan> {
    Ok(DrPlan {
        id: rows::uuid(row, 0)?,
        instance_id: rows::uuid(row, 1)?,
        backup_schedule_cron: row.get(2)?,
        retention_days: row.get(3)?,
        target_server_id: rows::opt_uuid(row, 4)?,
        last_backup_at: rows::opt_timestamp(row, 5)?,
        last_tested_at: rows::opt_timestamp(row, 6)?,
        last_test_status: rows::opt_parsed(row, 7)?,
        last_test_message: row.get(8)?,
        is_active: row.get(9)?,
        created_at: rows::timestamp(row, 10)?,
        updated_at: rows::timestamp(row, 11)?,
    })
}

impl super::Database {
    /// Creates an active plan for `instance_id`.
    ///
    /// References and the cron expression are validated by the caller; the
    /// foreign keys still reject ids that do not exist.
    pub fn create_plan(
        &mut self,
        instance_id: Uuid,
        backup_schedule_cron: &str,
        retention_days: u32,
        target_server_id: Option<Uuid>,
    ) -> Result<DrPlan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let id = Uuid::new_v4();
        let now = Timestamp::now();

        tx.execute(
            INSERT_PLAN_SQL,
            params![
                id.to_string(),
                instance_id.to_string(),
                backup_schedule_cron,
                retention_days,
                rows::opt_uuid_text(target_server_id),
                rows::timestamp_text(now),
            ],
        )
        .db_context("Failed to insert DR plan")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(DrPlan {
            id,
            instance_id,
            backup_schedule_cron: backup_schedule_cron.to_string(),
            retention_days,
            target_server_id,
            last_backup_at: None,
            last_tested_at: None,
            last_test_status: None,
            last_test_message: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a plan by its ID.
    pub fn get_plan(&self, id: Uuid) -> Result<Option<DrPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM dr_plans p WHERE p.id = ?1");
        self.connection
            .query_row(&sql, params![id.to_string()], plan_from_row)
            .optional()
            .db_context("Failed to query DR plan")
    }

    /// Retrieves the plan of an instance.
    ///
    /// At most one active plan per instance is expected but not enforced;
    /// active plans win, then the oldest.
    pub fn get_plan_for_instance(&self, instance_id: Uuid) -> Result<Option<DrPlan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM dr_plans p WHERE p.instance_id = ?1 \
             ORDER BY p.is_active DESC, p.created_at ASC LIMIT 1"
        );
        self.connection
            .query_row(&sql, params![instance_id.to_string()], plan_from_row)
            .optional()
            .db_context("Failed to query DR plan for instance")
    }

    /// Lists one page of plans, newest first.
    pub fn list_plans(&self, limit: u32, offset: u32) -> Result<Vec<DrPlan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM dr_plans p ORDER BY p.created_at DESC LIMIT ?1 OFFSET ?2"
        );
        self.query_plans(&sql, params![limit, offset])
    }

    /// Lists one page of plans whose instance belongs to `organization_id`.
    pub fn list_plans_for_organization(
        &self,
        organization_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<DrPlan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM dr_plans p JOIN instances i ON i.id = p.instance_id \
             WHERE i.org_id = ?1 ORDER BY p.created_at DESC LIMIT ?2 OFFSET ?3"
        );
        self.query_plans(&sql, params![organization_id.to_string(), limit, offset])
    }

    /// Lists every plan the scheduler should evaluate.
    pub fn list_active_plans(&self) -> Result<Vec<DrPlan>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM dr_plans p WHERE p.is_active = 1 ORDER BY p.created_at ASC"
        );
        self.query_plans(&sql, params![])
    }

    fn query_plans<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<DrPlan>> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .db_context("Failed to prepare query")?;

        let plans = stmt
            .query_map(params, plan_from_row)
            .db_context("Failed to query DR plans")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch DR plans")?;
        Ok(plans)
    }

    /// Applies a partial update and returns the new plan with a description
    /// of each field that changed.
    pub fn update_plan(
        &mut self,
        id: Uuid,
        request: &UpdateDrPlanRequest,
    ) -> Result<(DrPlan, Vec<String>)> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let sql = format!("SELECT {PLAN_COLUMNS} FROM dr_plans p WHERE p.id = ?1");
        let mut plan = tx
            .query_row(&sql, params![id.to_string()], plan_from_row)
            .optional()
            .db_context("Failed to get current DR plan")?
            .ok_or(DrError::PlanNotFound { id })?;

        let mut changes = Vec::new();

        if let Some(ref cron) = request.backup_schedule_cron {
            if *cron != plan.backup_schedule_cron {
                changes.push(format!("schedule: {cron}"));
                plan.backup_schedule_cron = cron.clone();
            }
        }
        if let Some(days) = request.retention_days {
            if days != plan.retention_days {
                changes.push(format!("retention: {days} days"));
                plan.retention_days = days;
            }
        }
        if let Some(server_id) = request.target_server_id {
            if Some(server_id) != plan.target_server_id {
                changes.push(format!("target server: {server_id}"));
                plan.target_server_id = Some(server_id);
            }
        }
        if let Some(active) = request.is_active {
            if active != plan.is_active {
                changes.push(if active { "activated" } else { "deactivated" }.to_string());
                plan.is_active = active;
            }
        }

        if changes.is_empty() {
            return Ok((plan, changes));
        }

        plan.updated_at = Timestamp::now();
        tx.execute(
            UPDATE_PLAN_SQL,
            params![
                &plan.backup_schedule_cron,
                plan.retention_days,
                rows::opt_uuid_text(plan.target_server_id),
                plan.is_active,
                rows::timestamp_text(plan.updated_at),
                id.to_string(),
            ],
        )
        .db_context("Failed to update DR plan")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok((plan, changes))
    }

    /// Hard-deletes a plan. Returns false when no such plan existed.
    pub fn delete_plan(&mut self, id: Uuid) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_PLAN_SQL, params![id.to_string()])
            .db_context("Failed to delete DR plan")?;
        Ok(deleted > 0)
    }

    /// Marks a DR test as in progress and clears the previous message.
    ///
    /// Committed on its own so observers see the running state while the
    /// rest of the test executes.
    pub fn mark_test_running(&self, id: Uuid) -> Result<()> {
        let updated = self
            .connection
            .execute(
                MARK_TEST_RUNNING_SQL,
                params![rows::timestamp_text(Timestamp::now()), id.to_string()],
            )
            .db_context("Failed to mark DR test running")?;
        if updated == 0 {
            return Err(DrError::PlanNotFound { id });
        }
        Ok(())
    }

    /// Persists the terminal outcome of a DR test.
    pub fn record_test_outcome(
        &self,
        id: Uuid,
        status: TestStatus,
        message: &str,
        tested_at: Timestamp,
    ) -> Result<()> {
        let updated = self
            .connection
            .execute(
                RECORD_TEST_OUTCOME_SQL,
                params![status.as_str(), message, rows::timestamp_text(tested_at), id.to_string()],
            )
            .db_context("Failed to record DR test outcome")?;
        if updated == 0 {
            return Err(DrError::PlanNotFound { id });
        }
        Ok(())
    }

    /// Advances `last_backup_at` after a completed backup.
    pub fn record_last_backup(&self, id: Uuid, completed_at: Timestamp) -> Result<()> {
        let updated = self
            .connection
            .execute(
                RECORD_LAST_BACKUP_SQL,
                params![
                    rows::timestamp_text(completed_at),
                    rows::timestamp_text(Timestamp::now()),
                    id.to_string()
                ],
            )
            .db_context("Failed to record last backup")?;
        if updated == 0 {
            return Err(DrError::PlanNotFound { id });
        }
        Ok(())
    }
}
