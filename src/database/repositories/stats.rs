use chrono::{Datelike, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::database::models::{AdminStats, EmployeeStats, ManagerStats, RoleBreakdown};
use crate::error::AppError;

#[derive(Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn year_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(Utc::now().year(), 1, 1).expect("jan 1 is always valid")
    }

    async fn count_timesheets(&self, user_id: &str, status: Option<&str>) -> Result<i64, AppError> {
        let count = match status {
            Some(s) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM timesheets WHERE user_id = ? AND status = ?")
                    .bind(user_id)
                    .bind(s)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM timesheets WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// The acting user's own year-to-date figures.
    pub async fn employee_stats(
        &self,
        user_id: &str,
        vacation_balance: f64,
    ) -> Result<EmployeeStats, AppError> {
        let year_start = Self::year_start();

        let total_hours: f64 = sqlx::query_scalar(
            r#"
            SELECT
                CAST(COALESCE(SUM(total_hours), 0) AS REAL)
            FROM
                timesheets
            WHERE
                user_id = ?
                AND status = 'approved'
                AND week_starting >= ?
            "#,
        )
        .bind(user_id)
        .bind(year_start)
        .fetch_one(&self.pool)
        .await?;

        let vacation_days_used: f64 = sqlx::query_scalar(
            r#"
            SELECT
                CAST(COALESCE(SUM(days_requested), 0) AS REAL)
            FROM
                vacation_requests
            WHERE
                user_id = ?
                AND status = 'approved'
                AND request_type = 'vacation'
                AND start_date >= ?
            "#,
        )
        .bind(user_id)
        .bind(year_start)
        .fetch_one(&self.pool)
        .await?;

        let pending_vacation_requests: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vacation_requests WHERE user_id = ? AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let approved_vacation_requests: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vacation_requests WHERE user_id = ? AND status = 'approved'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EmployeeStats {
            total_timesheets: self.count_timesheets(user_id, None).await?,
            draft_timesheets: self.count_timesheets(user_id, Some("draft")).await?,
            submitted_timesheets: self.count_timesheets(user_id, Some("submitted")).await?,
            approved_timesheets: self.count_timesheets(user_id, Some("approved")).await?,
            rejected_timesheets: self.count_timesheets(user_id, Some("rejected")).await?,
            total_hours,
            vacation_days_used,
            vacation_balance,
            pending_vacation_requests,
            approved_vacation_requests,
        })
    }

    /// Items waiting on a reviewer, excluding that reviewer's own
    /// submissions.
    pub async fn manager_stats(&self, reviewer_id: &str) -> Result<ManagerStats, AppError> {
        let timesheets_awaiting_review: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM timesheets WHERE status = 'submitted' AND user_id != ?",
        )
        .bind(reviewer_id)
        .fetch_one(&self.pool)
        .await?;

        let vacation_requests_awaiting_review: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM vacation_requests WHERE status = 'pending' AND user_id != ?",
        )
        .bind(reviewer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ManagerStats {
            timesheets_awaiting_review,
            vacation_requests_awaiting_review,
        })
    }

    /// System-wide totals and the per-role user breakdown.
    pub async fn admin_stats(&self) -> Result<AdminStats, AppError> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'employee'")
            .fetch_one(&self.pool)
            .await?;

        let managers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'manager'")
            .fetch_one(&self.pool)
            .await?;

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await?;

        let total_timesheets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM timesheets")
            .fetch_one(&self.pool)
            .await?;

        let total_vacation_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vacation_requests")
                .fetch_one(&self.pool)
                .await?;

        let total_hours_logged: f64 = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(total_hours), 0) AS REAL) FROM timesheets WHERE status = 'approved'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_users,
            users_by_role: RoleBreakdown {
                employees,
                managers,
                admins,
            },
            total_timesheets,
            total_vacation_requests,
            total_hours_logged,
        })
    }
}
