use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::{
    ReviewInput, TimesheetEditInput, TimesheetInput, TimesheetStatus,
};
use crate::database::repositories::TimesheetRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::notifications::{NotificationKind, Notifier};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

/// Create a weekly timesheet in DRAFT for the acting user.
pub async fn create_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    input: web::Json<TimesheetInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let timesheet = repo
        .create(claims.user_id(), input.week_starting, &input.entries)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(timesheet)))
}

/// List timesheets. Employees only ever see their own; managers and admins
/// may filter by user.
pub async fn get_timesheets(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    query: web::Query<TimesheetQuery>,
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
            s.parse::<TimesheetStatus>()
                .map_err(|_| AppError::BadRequest(format!("invalid status: {}", s)))
        })
        .transpose()?;

    let timesheets = repo.list(user_filter, status_filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(timesheets)))
}

pub async fn get_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let timesheet = repo
        .get_with_entries(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))?;

    if timesheet.timesheet.user_id != claims.sub && !claims.is_manager_or_admin() {
        return Err(AppError::NotOwner(
            "cannot view other users' timesheets".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(timesheet)))
}

/// Wholesale entry replacement, DRAFT only.
pub async fn edit_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    path: web::Path<String>,
    input: web::Json<TimesheetEditInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))?;

    if existing.user_id != claims.sub {
        return Err(AppError::NotOwner(
            "cannot edit another user's timesheet".to_string(),
        ));
    }

    let updated = repo
        .replace_entries(&id, existing.week_starting, &input.entries)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// DRAFT -> SUBMITTED by the owner; notifies everyone ranked manager+.
pub async fn submit_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))?;

    if existing.user_id != claims.sub {
        return Err(AppError::NotOwner(
            "only the owner can submit a timesheet".to_string(),
        ));
    }

    let timesheet = repo.submit(&id).await?;

    notifier.notify_reviewers(
        NotificationKind::TimesheetSubmitted,
        json!({
            "timesheetId": timesheet.id,
            "employeeEmail": claims.email,
            "weekStarting": timesheet.week_starting,
            "totalHours": timesheet.total_hours,
        }),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(timesheet)))
}

/// SUBMITTED -> APPROVED by a manager or admin. Reviewing one's own
/// timesheet is permitted; the vacation path differs deliberately.
pub async fn approve_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::InsufficientPermission(
            "only managers can review timesheets".to_string(),
        ));
    }

    let id = path.into_inner();

    repo.get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))?;

    let timesheet = repo.approve(&id, claims.user_id()).await?;

    notifier.notify_user(
        timesheet.user_id.clone(),
        NotificationKind::TimesheetApproved,
        json!({
            "timesheetId": timesheet.id,
            "weekStarting": timesheet.week_starting,
            "reviewedBy": claims.email,
        }),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(timesheet)))
}

/// SUBMITTED -> REJECTED with review comments.
pub async fn reject_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<String>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::InsufficientPermission(
            "only managers can review timesheets".to_string(),
        ));
    }

    let id = path.into_inner();

    repo.get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))?;

    let timesheet = repo
        .reject(&id, claims.user_id(), input.into_inner().comments)
        .await?;

    notifier.notify_user(
        timesheet.user_id.clone(),
        NotificationKind::TimesheetRejected,
        json!({
            "timesheetId": timesheet.id,
            "weekStarting": timesheet.week_starting,
            "rejectionReason": timesheet.rejection_reason,
            "reviewedBy": claims.email,
        }),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(timesheet)))
}

/// Owners may delete anything not yet approved.
pub async fn delete_timesheet(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timesheet {}", id)))?;

    if existing.user_id != claims.sub {
        return Err(AppError::NotOwner(
            "only the owner can delete a timesheet".to_string(),
        ));
    }

    repo.delete(&id).await?;

    Ok(HttpResponse::NoContent().finish())
}
