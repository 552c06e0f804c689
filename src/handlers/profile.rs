use actix_web::{web, HttpResponse};

use crate::database::models::ProfileUpdateInput;
use crate::database::repositories::ProfileRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn get_profile(
    claims: Claims,
    repo: web::Data<ProfileRepository>,
) -> Result<HttpResponse, AppError> {
    let profile = repo
        .get_by_user_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile for user {}", claims.sub)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

/// Partial update: absent fields keep their stored values.
pub async fn update_profile(
    claims: Claims,
    repo: web::Data<ProfileRepository>,
    input: web::Json<ProfileUpdateInput>,
) -> Result<HttpResponse, AppError> {
    let profile = repo.update(claims.user_id(), &input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}
