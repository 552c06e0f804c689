use actix_web::{web, HttpResponse};

use crate::database::models::{CreateUserRequest, LoginRequest, UserInfo};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::AppState;

pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .register(input.into_inner())
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::success(response)))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .login(input.into_inner())
        .await
        .map_err(|_| AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn me(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
) -> Result<HttpResponse, AppError> {
    let user = user_repo
        .find_by_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", claims.sub)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}
