use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    days_requested, VacationRequest, VacationRequestInput, VacationStatus, VacationType,
};
use crate::database::repositories::profile::ProfileRepository;
use crate::error::AppError;

#[derive(Clone)]
pub struct VacationRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = r#"
    id,
    user_id,
    request_type,
    start_date,
    end_date,
    days_requested,
    status,
    reason,
    submitted_at,
    reviewed_at,
    reviewed_by,
    review_comments,
    created_at,
    updated_at
"#;

impl VacationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// True when the user already has a pending or approved request sharing
    /// at least one day with [start_date, end_date]. `exclude_id` skips the
    /// request being updated.
    async fn has_overlap(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT
                    1
                FROM
                    vacation_requests
                WHERE
                    user_id = ?
                    AND status IN ('pending', 'approved')
                    AND start_date <= ?
                    AND end_date >= ?
                    AND id != COALESCE(?, '')
            )
            "#,
        )
        .bind(user_id)
        .bind(end_date)
        .bind(start_date)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Creates a PENDING request. VACATION-type requests are pre-checked
    /// against the available balance but nothing is debited yet.
    pub async fn create(
        &self,
        user_id: &str,
        input: &VacationRequestInput,
        available_balance: f64,
    ) -> Result<VacationRequest, AppError> {
        let days = days_requested(input.start_date, input.end_date)?;

        if self
            .has_overlap(user_id, input.start_date, input.end_date, None)
            .await?
        {
            return Err(AppError::OverlappingRequest);
        }

        if input.request_type == VacationType::Vacation && days as f64 > available_balance {
            return Err(AppError::InsufficientBalance {
                requested: days as f64,
                available: available_balance,
            });
        }

        let now = Utc::now().naive_utc();
        let request = VacationRequest {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            request_type: input.request_type,
            start_date: input.start_date,
            end_date: input.end_date,
            days_requested: days,
            status: VacationStatus::Pending,
            reason: input.reason.clone(),
            submitted_at: now,
            reviewed_at: None,
            reviewed_by: None,
            review_comments: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO
                vacation_requests (
                    id,
                    user_id,
                    request_type,
                    start_date,
                    end_date,
                    days_requested,
                    status,
                    reason,
                    submitted_at,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(&request.user_id)
        .bind(request.request_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.days_requested)
        .bind(request.status)
        .bind(&request.reason)
        .bind(request.submitted_at)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<VacationRequest>, AppError> {
        let request = sqlx::query_as::<_, VacationRequest>(&format!(
            "SELECT {} FROM vacation_requests WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// List requests with optional user/status filters, newest first.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        status: Option<VacationStatus>,
    ) -> Result<Vec<VacationRequest>, AppError> {
        let mut query = format!("SELECT {} FROM vacation_requests", SELECT_COLUMNS);

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

        query.push_str(" ORDER BY created_at DESC");

        let mut prepared = sqlx::query_as::<_, VacationRequest>(&query);
        for param in params {
            prepared = prepared.bind(param);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// Rewrites a PENDING request: dates re-derive the day count, the
    /// overlap check re-runs excluding this request, and VACATION requests
    /// re-check the balance.
    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        input: &VacationRequestInput,
        available_balance: f64,
    ) -> Result<VacationRequest, AppError> {
        let days = days_requested(input.start_date, input.end_date)?;

        if self
            .has_overlap(user_id, input.start_date, input.end_date, Some(id))
            .await?
        {
            return Err(AppError::OverlappingRequest);
        }

        if input.request_type == VacationType::Vacation && days as f64 > available_balance {
            return Err(AppError::InsufficientBalance {
                requested: days as f64,
                available: available_balance,
            });
        }

        let result = sqlx::query(
            r#"
            UPDATE
                vacation_requests
            SET
                request_type = ?,
                start_date = ?,
                end_date = ?,
                days_requested = ?,
                reason = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
            "#,
        )
        .bind(input.request_type)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(days)
        .bind(&input.reason)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only pending requests can be updated".to_string(),
            ));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))
    }

    /// PENDING -> APPROVED. For VACATION requests the balance debit and the
    /// status flip share one transaction: both commit or neither does.
    /// Returns the updated request and the new balance when one was debited.
    pub async fn approve(
        &self,
        id: &str,
        reviewer_id: &str,
        comments: Option<String>,
    ) -> Result<(VacationRequest, Option<f64>), AppError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, VacationRequest>(&format!(
            "SELECT {} FROM vacation_requests WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

        // Check the state before touching the balance: a request that has
        // already been reviewed must fail as a state conflict, not as an
        // insufficient balance.
        if request.status != VacationStatus::Pending {
            return Err(AppError::InvalidState(
                "only pending requests can be reviewed".to_string(),
            ));
        }

        let new_balance = if request.request_type == VacationType::Vacation {
            Some(
                ProfileRepository::debit_vacation(
                    &mut tx,
                    &request.user_id,
                    request.days_requested as f64,
                )
                .await?,
            )
        } else {
            None
        };

        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            r#"
            UPDATE
                vacation_requests
            SET
                status = 'approved',
                reviewed_at = ?,
                reviewed_by = ?,
                review_comments = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(reviewer_id)
        .bind(&comments)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls the debit back with it
            return Err(AppError::InvalidState(
                "only pending requests can be reviewed".to_string(),
            ));
        }

        tx.commit().await?;

        let updated = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

        Ok((updated, new_balance))
    }

    /// PENDING -> REJECTED; never touches the balance.
    pub async fn reject(
        &self,
        id: &str,
        reviewer_id: &str,
        comments: Option<String>,
    ) -> Result<VacationRequest, AppError> {
        let now = Utc::now().naive_utc();
        let comments = comments.unwrap_or_else(|| "No reason provided".to_string());

        let result = sqlx::query(
            r#"
            UPDATE
                vacation_requests
            SET
                status = 'rejected',
                reviewed_at = ?,
                reviewed_by = ?,
                review_comments = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
            "#,
        )
        .bind(now)
        .bind(reviewer_id)
        .bind(comments)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only pending requests can be reviewed".to_string(),
            ));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))
    }

    /// Owners may delete a request while it is still pending.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM vacation_requests WHERE id = ? AND status = 'pending'")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidState(
                "only pending requests can be deleted".to_string(),
            ));
        }

        Ok(())
    }
}
