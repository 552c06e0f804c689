use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    pub id: String,
    pub user_id: String,
    pub request_type: VacationType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i64,
    pub status: VacationStatus,
    pub reason: String,
    pub submitted_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<String>,
    pub review_comments: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum VacationType {
        Vacation => "vacation",
        Sick => "sick",
        Personal => "personal",
        Bereavement => "bereavement",
        Maternity => "maternity",
        Paternity => "paternity",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum VacationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequestInput {
    pub request_type: VacationType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

/// Inclusive day count of a request's date range, always >= 1 for a valid
/// range. Fails with `InvalidDateRange` when the end precedes the start.
pub fn days_requested(start_date: NaiveDate, end_date: NaiveDate) -> Result<i64, AppError> {
    if end_date < start_date {
        return Err(AppError::InvalidDateRange(format!(
            "end date {} is before start date {}",
            end_date, start_date
        )));
    }
    Ok((end_date - start_date).num_days() + 1)
}

/// Two date ranges overlap when they share at least one calendar day;
/// a shared boundary day counts.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}
