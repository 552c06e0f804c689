use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    derive_week, Timesheet, TimesheetEntry, TimesheetEntryInput, TimesheetStatus,
    TimesheetWithEntries,
};
use crate::error::AppError;

#[derive(Clone)]
pub struct TimesheetRepository {
    pool: SqlitePool,
}

impl TimesheetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a DRAFT timesheet with its entries. The week must start on a
    /// Monday and be unique per user; entry hours are derived here.
    pub async fn create(
        &self,
        user_id: &str,
        week_starting: NaiveDate,
        entries: &[TimesheetEntryInput],
    ) -> Result<TimesheetWithEntries, AppError> {
        let (hours, total_hours) = derive_week(week_starting, entries)?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM timesheets WHERE user_id = ? AND week_starting = ?)",
        )
        .bind(user_id)
        .bind(week_starting)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::DuplicateWeek(week_starting));
        }

        let now = Utc::now().naive_utc();
        let timesheet = Timesheet {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            week_starting,
            status: TimesheetStatus::Draft,
            total_hours,
            submitted_at: None,
            reviewed_at: None,
            approved_by: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO
                timesheets (
                    id,
                    user_id,
                    week_starting,
                    status,
                    total_hours,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&timesheet.id)
        .bind(&timesheet.user_id)
        .bind(timesheet.week_starting)
        .bind(timesheet.status)
        .bind(timesheet.total_hours)
        .bind(timesheet.created_at)
        .bind(timesheet.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| match &err {
            // A concurrent create can slip past the existence check above;
            // the UNIQUE (user_id, week_starting) constraint is the arbiter.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateWeek(week_starting)
            }
            _ => AppError::from(err),
        })?;

        let mut stored_entries = Vec::with_capacity(entries.len());
        for (entry, hours_worked) in entries.iter().zip(hours) {
            let stored = TimesheetEntry {
                id: Uuid::new_v4().to_string(),
                timesheet_id: timesheet.id.clone(),
                work_date: entry.work_date,
                start_time: entry.start_time,
                end_time: entry.end_time,
                break_minutes: entry.break_minutes,
                hours_worked,
                notes: entry.notes.clone(),
            };

            sqlx::query(
                r#"
                INSERT INTO
                    timesheet_entries (
                        id,
                        timesheet_id,
                        work_date,
                        start_time,
                        end_time,
                        break_minutes,
                        hours_worked,
                        notes
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&stored.id)
            .bind(&stored.timesheet_id)
            .bind(stored.work_date)
            .bind(stored.start_time)
            .bind(stored.end_time)
            .bind(stored.break_minutes)
            .bind(stored.hours_worked)
            .bind(&stored.notes)
            .execute(&mut *tx)
            .await?;

            stored_entries.push(stored);
        }

        tx.commit().await?;

        stored_entries.sort_by_key(|e| e.work_date);
        Ok(TimesheetWithEntries {
            timesheet,
            entries: stored_entries,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Timesheet>, AppError> {
        let timesheet = sqlx::query_as::<_, Timesheet>(
            r#"
            SELECT
                id,
                user_id,
                week_starting,
                status,
                total_hours,
                submitted_at,
                reviewed_at,
                approved_by,
                rejection_reason,
                created_at,
                updated_at
            FROM
                timesheets
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(timesheet)
    }

    pub async fn get_with_entries(
        &self,
        id: &str,
    ) -> Result<Option<TimesheetWithEntries>, AppError> {
        let Some(timesheet) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let entries = sqlx::query_as::<_, TimesheetEntry>(
            r#"
            SELECT
                id,
                timesheet_id,
                work_date,
                start_time,
                end_time,
                break_minutes,
                hours_worked,
                notes
            FROM
                timesheet_entries
            WHERE
                timesheet_id = ?
            ORDER BY
                work_date ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(TimesheetWithEntries { timesheet, entries }))
    }

    /// List timesheets with optional user/status filters, newest week first.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        status: Option<TimesheetStatus>,
    ) -> Result<Vec<Timesheet>, AppError> {
        let mut query = r#"
            SELECT
                id,
                user_id,
                week_starting,
                status,
                total_hours,
                submitted_at,
                reviewed_at,
                approved_by,
                rejection_reason,
                created_at,
                updated_at
            FROM
                timesheets
            "#
        .to_string();

        let mut conditions = vec![];
        let mut params = Vec::new();

        if let Some(uid) = user_id {
            conditions.push("user_id = ?");
            params.push(uid.to_string());
        }

        if let Some(s) = status {
            conditions.push("status = ?");
            params.push(s.to_string());
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY week_starting DESC");

        let mut prepared = sqlx::query_as::<_, Timesheet>(&query);
        for param in params {
            prepared = prepared.bind(param);
        }

        let timesheets = prepared.fetch_all(&self.pool).await?;

        Ok(timesheets)
    }

    /// Replaces the entry set wholesale and recomputes the total. Only DRAFT
    /// timesheets accept edits; the status is re-checked at write time.
    pub async fn replace_entries(
        &self,
        id: &str,
        week_starting: NaiveDate,
        entries: &[TimesheetEntryInput],
    ) -> Result<TimesheetWithEntries, AppError> {
        let (hours, total_hours) = derive_week(week_starting, entries)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE
                timesheets
            SET
                total_hours = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'draft'
            "#,
        )
        .bind(total_hours)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only draft timesheets can be edited".to_string(),
            ));
        }

        sqlx::query("DELETE FROM timesheet_entries WHERE timesheet_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for (entry, hours_worked) in entries.iter().zip(hours) {
            sqlx::query(
                r#"
                INSERT INTO
                    timesheet_entries (
                        id,
                        timesheet_id,
                        work_date,
                        start_time,
                        end_time,
                        break_minutes,
                        hours_worked,
                        notes
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id)
            .bind(entry.work_date)
            .bind(entry.start_time)
            .bind(entry.end_time)
            .bind(entry.break_minutes)
            .bind(hours_worked)
            .bind(&entry.notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_with_entries(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))
    }

    /// DRAFT -> SUBMITTED. Conditional on the current status so a concurrent
    /// submit or review loses cleanly with `InvalidState`.
    pub async fn submit(&self, id: &str) -> Result<Timesheet, AppError> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE
                timesheets
            SET
                status = 'submitted',
                submitted_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'draft'
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only draft timesheets can be submitted".to_string(),
            ));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))
    }

    /// SUBMITTED -> APPROVED, stamping the reviewer.
    pub async fn approve(&self, id: &str, reviewer_id: &str) -> Result<Timesheet, AppError> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE
                timesheets
            SET
                status = 'approved',
                reviewed_at = ?,
                approved_by = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'submitted'
            "#,
        )
        .bind(now)
        .bind(reviewer_id)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only submitted timesheets can be reviewed".to_string(),
            ));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))
    }

    /// SUBMITTED -> REJECTED with a reason.
    pub async fn reject(
        &self,
        id: &str,
        reviewer_id: &str,
        reason: Option<String>,
    ) -> Result<Timesheet, AppError> {
        let now = Utc::now().naive_utc();
        let reason = reason.unwrap_or_else(|| "No reason provided".to_string());

        let result = sqlx::query(
            r#"
            UPDATE
                timesheets
            SET
                status = 'rejected',
                reviewed_at = ?,
                approved_by = ?,
                rejection_reason = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'submitted'
            "#,
        )
        .bind(now)
        .bind(reviewer_id)
        .bind(reason)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only submitted timesheets can be reviewed".to_string(),
            ));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))
    }

    /// Owners may delete anything not yet approved; entries cascade.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM timesheets WHERE id = ? AND status != 'approved'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "approved timesheets cannot be deleted".to_string(),
            ));
        }

        Ok(())
    }
}
