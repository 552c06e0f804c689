use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::database::models::{BalanceOverrideInput, Profile, ProfileUpdateInput};
use crate::error::AppError;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO
                profiles (
                    user_id,
                    province,
                    vacation_balance,
                    accrued_days,
                    used_days,
                    email_notifications,
                    time_format,
                    theme,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.user_id)
        .bind(profile.province)
        .bind(profile.vacation_balance)
        .bind(profile.accrued_days)
        .bind(profile.used_days)
        .bind(profile.email_notifications)
        .bind(profile.time_format)
        .bind(profile.theme)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT
                user_id,
                province,
                vacation_balance,
                accrued_days,
                used_days,
                email_notifications,
                time_format,
                theme,
                created_at,
                updated_at
            FROM
                profiles
            WHERE
                user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Merges a partial preference update onto the stored profile.
    pub async fn update(
        &self,
        user_id: &str,
        update: &ProfileUpdateInput,
    ) -> Result<Profile, AppError> {
        let current = self
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user {}", user_id)))?;

        let merged = current.merged_with(update);
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE
                profiles
            SET
                province = ?,
                email_notifications = ?,
                time_format = ?,
                theme = ?,
                updated_at = ?
            WHERE
                user_id = ?
            "#,
        )
        .bind(merged.province)
        .bind(merged.email_notifications)
        .bind(merged.time_format)
        .bind(merged.theme)
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(Profile {
            updated_at: now,
            ..merged
        })
    }

    /// Debits vacation days inside the caller's transaction. The balance
    /// guard is re-checked at write time so the debit can never push the
    /// balance negative, whatever the caller read earlier.
    pub async fn debit_vacation(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: &str,
        days: f64,
    ) -> Result<f64, AppError> {
        let available: Option<f64> =
            sqlx::query_scalar("SELECT vacation_balance FROM profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

        let available =
            available.ok_or_else(|| AppError::NotFound(format!("profile for user {}", user_id)))?;

        let result = sqlx::query(
            r#"
            UPDATE
                profiles
            SET
                vacation_balance = vacation_balance - ?,
                used_days = used_days + ?,
                updated_at = ?
            WHERE
                user_id = ?
                AND vacation_balance >= ?
            "#,
        )
        .bind(days)
        .bind(days)
        .bind(Utc::now().naive_utc())
        .bind(user_id)
        .bind(days)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InsufficientBalance {
                requested: days,
                available,
            });
        }

        Ok(available - days)
    }

    /// Administrative override: sets the provided fields directly, bypassing
    /// the debit path. Still refuses a negative balance.
    pub async fn override_balance(
        &self,
        user_id: &str,
        input: &BalanceOverrideInput,
    ) -> Result<Profile, AppError> {
        let current = self
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user {}", user_id)))?;

        let vacation_balance = input.vacation_balance.unwrap_or(current.vacation_balance);
        if vacation_balance < 0.0 {
            return Err(AppError::BadRequest(
                "vacation balance cannot be negative".to_string(),
            ));
        }

        let accrued_days = input.accrued_days.unwrap_or(current.accrued_days);
        let used_days = input.used_days.unwrap_or(current.used_days);
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE
                profiles
            SET
                vacation_balance = ?,
                accrued_days = ?,
                used_days = ?,
                updated_at = ?
            WHERE
                user_id = ?
            "#,
        )
        .bind(vacation_balance)
        .bind(accrued_days)
        .bind(used_days)
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(Profile {
            vacation_balance,
            accrued_days,
            used_days,
            updated_at: now,
            ..current
        })
    }
}
