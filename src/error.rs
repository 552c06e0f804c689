use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::NaiveDate;
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not the owner: {0}")]
    NotOwner(String),

    #[error("Insufficient permissions: {0}")]
    InsufficientPermission(String),

    #[error("Reviewers cannot approve or reject their own request")]
    SelfApproval,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Week must start on a Monday, got {0}")]
    InvalidWeekStart(NaiveDate),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("A timesheet already exists for the week of {0}")]
    DuplicateWeek(NaiveDate),

    #[error("Request overlaps an existing pending or approved request")]
    OverlappingRequest,

    #[error("Insufficient vacation balance: {requested} days requested, {available} available")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    Internal(Option<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotOwner(_)
            | AppError::InsufficientPermission(_)
            | AppError::SelfApproval => StatusCode::FORBIDDEN,
            AppError::InvalidState(_)
            | AppError::DuplicateWeek(_)
            | AppError::OverlappingRequest => StatusCode::CONFLICT,
            AppError::InvalidEntry(_)
            | AppError::InvalidWeekStart(_)
            | AppError::InvalidDateRange(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, error_message);
        } else {
            log::debug!("Request rejected with status {}: {}", status_code, error_message);
        }

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(&error_message))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::Database(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        if error.is::<sqlx::Error>() {
            match error.downcast::<sqlx::Error>() {
                Ok(sqlx_err) => return AppError::Database(sqlx_err),
                Err(original) => return AppError::Internal(Some(original.to_string())),
            }
        }

        AppError::Internal(Some(error.to_string()))
    }
}
