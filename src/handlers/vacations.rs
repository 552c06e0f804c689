use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::{ReviewInput, VacationRequestInput, VacationStatus};
use crate::database::repositories::{ProfileRepository, VacationRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::notifications::{NotificationKind, Notifier};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

async fn available_balance(
    profiles: &ProfileRepository,
    user_id: &str,
) -> Result<f64, AppError> {
    let profile = profiles
        .get_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile for user {}", user_id)))?;

    Ok(profile.vacation_balance)
}

/// Create a PENDING leave request for the acting user; notifies reviewers.
pub async fn create_vacation_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    profiles: web::Data<ProfileRepository>,
    notifier: web::Data<Notifier>,
    input: web::Json<VacationRequestInput>,
) -> Result<HttpResponse, AppError> {
    let balance = available_balance(&profiles, claims.user_id()).await?;
    let request = repo
        .create(claims.user_id(), &input.into_inner(), balance)
        .await?;

    notifier.notify_reviewers(
        NotificationKind::VacationSubmitted,
        json!({
            "requestId": request.id,
            "employeeEmail": claims.email,
            "requestType": request.request_type,
            "startDate": request.start_date,
            "endDate": request.end_date,
            "daysRequested": request.days_requested,
        }),
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// List requests. Employees only ever see their own.
pub async fn get_vacation_requests(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    query: web::Query<VacationQuery>,
) -> Result<HttpResponse, AppError> {
    let user_filter = if claims.is_manager_or_admin() {
        query.user_id.as_deref()
    } else {
        Some(claims.user_id())
    };

    let status_filter = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<VacationStatus>()
                .map_err(|_| AppError::BadRequest(format!("invalid status: {}", s)))
        })
        .transpose()?;

    let requests = repo.list(user_filter, status_filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_vacation_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let request = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

    if request.user_id != claims.sub && !claims.is_manager_or_admin() {
        return Err(AppError::NotOwner(
            "cannot view other users' requests".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Owner-only rewrite of a PENDING request.
pub async fn update_vacation_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    profiles: web::Data<ProfileRepository>,
    path: web::Path<String>,
    input: web::Json<VacationRequestInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

    if existing.user_id != claims.sub {
        return Err(AppError::NotOwner(
            "cannot update another user's request".to_string(),
        ));
    }

    let balance = available_balance(&profiles, claims.user_id()).await?;
    let updated = repo
        .update(&id, claims.user_id(), &input.into_inner(), balance)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// PENDING -> APPROVED by a manager or admin other than the requester.
/// A VACATION approval debits the balance in the same transaction.
pub async fn approve_vacation_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<String>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::InsufficientPermission(
            "only managers can review vacation requests".to_string(),
        ));
    }

    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

    if existing.user_id == claims.sub {
        return Err(AppError::SelfApproval);
    }

    let (request, new_balance) = repo
        .approve(&id, claims.user_id(), input.into_inner().comments)
        .await?;

    notifier.notify_user(
        request.user_id.clone(),
        NotificationKind::VacationApproved,
        json!({
            "requestId": request.id,
            "requestType": request.request_type,
            "startDate": request.start_date,
            "endDate": request.end_date,
            "daysRequested": request.days_requested,
            "newBalance": new_balance,
            "reviewedBy": claims.email,
        }),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// PENDING -> REJECTED; never touches the balance.
pub async fn reject_vacation_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<String>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::InsufficientPermission(
            "only managers can review vacation requests".to_string(),
        ));
    }

    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

    if existing.user_id == claims.sub {
        return Err(AppError::SelfApproval);
    }

    let request = repo
        .reject(&id, claims.user_id(), input.into_inner().comments)
        .await?;

    notifier.notify_user(
        request.user_id.clone(),
        NotificationKind::VacationRejected,
        json!({
            "requestId": request.id,
            "requestType": request.request_type,
            "reviewComments": request.review_comments,
            "reviewedBy": claims.email,
        }),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Owners may delete a request while it is still pending.
pub async fn delete_vacation_request(
    claims: Claims,
    repo: web::Data<VacationRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vacation request {}", id)))?;

    if existing.user_id != claims.sub {
        return Err(AppError::NotOwner(
            "only the owner can delete a request".to_string(),
        ));
    }

    repo.delete(&id).await?;

    Ok(HttpResponse::NoContent().finish())
}
