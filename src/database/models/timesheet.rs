use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use crate::error::AppError;

pub const MAX_BREAK_MINUTES: i64 = 480;
pub const MAX_ENTRY_HOURS: f64 = 24.0;
pub const MAX_WEEK_HOURS: f64 = 168.0;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: String,
    pub user_id: String,
    pub week_starting: NaiveDate,
    pub status: TimesheetStatus,
    pub total_hours: f64,
    pub submitted_at: Option<NaiveDateTime>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub approved_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub id: String,
    pub timesheet_id: String,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i64,
    pub hours_worked: f64,
    pub notes: Option<String>,
}

/// Timesheet with its entries hydrated, ordered by work date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetWithEntries {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub entries: Vec<TimesheetEntry>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum TimesheetStatus {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntryInput {
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub break_minutes: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetInput {
    pub week_starting: NaiveDate,
    pub entries: Vec<TimesheetEntryInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEditInput {
    pub entries: Vec<TimesheetEntryInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub comments: Option<String>,
}

impl TimesheetEntryInput {
    /// Derived hours for one work day: (end - start) minus break, floored at
    /// zero. Rejects end <= start, break outside [0, 480], and > 24h days.
    pub fn hours_worked(&self) -> Result<f64, AppError> {
        if self.end_time <= self.start_time {
            return Err(AppError::InvalidEntry(format!(
                "end time {} must be after start time {} on {}",
                self.end_time, self.start_time, self.work_date
            )));
        }

        if !(0..=MAX_BREAK_MINUTES).contains(&self.break_minutes) {
            return Err(AppError::InvalidEntry(format!(
                "break of {} minutes on {} is outside 0-{}",
                self.break_minutes, self.work_date, MAX_BREAK_MINUTES
            )));
        }

        let worked_minutes = (self.end_time - self.start_time).num_minutes();
        let hours = ((worked_minutes - self.break_minutes) as f64 / 60.0).max(0.0);

        if hours > MAX_ENTRY_HOURS {
            return Err(AppError::InvalidEntry(format!(
                "{:.2} hours on {} exceeds the {}h daily limit",
                hours, self.work_date, MAX_ENTRY_HOURS
            )));
        }

        Ok(hours)
    }
}

/// Validates a week start and its entries, returning the per-entry hours and
/// the derived weekly total.
pub fn derive_week(
    week_starting: NaiveDate,
    entries: &[TimesheetEntryInput],
) -> Result<(Vec<f64>, f64), AppError> {
    if week_starting.weekday() != Weekday::Mon {
        return Err(AppError::InvalidWeekStart(week_starting));
    }

    let hours = entries
        .iter()
        .map(TimesheetEntryInput::hours_worked)
        .collect::<Result<Vec<_>, _>>()?;

    let total: f64 = hours.iter().sum();
    if total > MAX_WEEK_HOURS {
        return Err(AppError::InvalidEntry(format!(
            "{:.2} total hours exceeds the {}h weekly limit",
            total, MAX_WEEK_HOURS
        )));
    }

    Ok((hours, total))
}
