use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::database::models::{BalanceOverrideInput, UserInfo, UserRole};
use crate::database::repositories::{ProfileRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateInput {
    pub role: UserRole,
}

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin() {
        return Err(AppError::InsufficientPermission(
            "admin access required".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_users(
    claims: Claims,
    repo: web::Data<UserRepository>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let users: Vec<UserInfo> = repo
        .get_all_users()
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

pub async fn update_user_role(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<String>,
    input: web::Json<RoleUpdateInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let user = repo.update_role(&path.into_inner(), input.role).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}

/// Removes a user; their profile, timesheets, and vacation requests cascade.
pub async fn delete_user(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let user_id = path.into_inner();
    if user_id == claims.sub {
        return Err(AppError::BadRequest(
            "admins cannot delete their own account".to_string(),
        ));
    }

    repo.delete_user(&user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Administrative balance override, the only mutation of vacation balances
/// outside the approval debit.
pub async fn override_balance(
    claims: Claims,
    profiles: web::Data<ProfileRepository>,
    path: web::Path<String>,
    input: web::Json<BalanceOverrideInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let profile = profiles
        .override_balance(&path.into_inner(), &input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}
