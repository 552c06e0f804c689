use actix_web::{web, HttpResponse};

use crate::database::models::DashboardStats;
use crate::database::repositories::{ProfileRepository, StatsRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Role-scoped dashboard: everyone gets their own figures, managers also get
/// their review queue (minus their own items), admins also get system totals.
pub async fn get_dashboard_stats(
    claims: Claims,
    repo: web::Data<StatsRepository>,
    profiles: web::Data<ProfileRepository>,
) -> Result<HttpResponse, AppError> {
    let vacation_balance = profiles
        .get_by_user_id(claims.user_id())
        .await?
        .map(|p| p.vacation_balance)
        .unwrap_or(0.0);

    let employee = repo.employee_stats(claims.user_id(), vacation_balance).await?;

    let manager = if claims.is_manager_or_admin() {
        Some(repo.manager_stats(claims.user_id()).await?)
    } else {
        None
    };

    let admin = if claims.is_admin() {
        Some(repo.admin_stats().await?)
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(DashboardStats {
        employee,
        manager,
        admin,
    })))
}
