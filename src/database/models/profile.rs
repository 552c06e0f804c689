use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

/// Per-user HR attributes. `vacation_balance` is in days and must never go
/// negative; the vacation repository owns the only non-administrative debit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub province: Province,
    pub vacation_balance: f64,
    pub accrued_days: f64,
    pub used_days: f64,
    pub email_notifications: bool,
    pub time_format: TimeFormat,
    pub theme: Theme,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum Province {
        Alberta => "AB",
        BritishColumbia => "BC",
        Manitoba => "MB",
        NewBrunswick => "NB",
        NewfoundlandAndLabrador => "NL",
        NovaScotia => "NS",
        NorthwestTerritories => "NT",
        Nunavut => "NU",
        Ontario => "ON",
        PrinceEdwardIsland => "PE",
        Quebec => "QC",
        Saskatchewan => "SK",
        Yukon => "YT",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum TimeFormat {
        H12 => "h12",
        H24 => "h24",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum Theme {
        Light => "light",
        Dark => "dark",
        System => "system",
    }
}

/// Partial profile update: absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateInput {
    pub province: Option<Province>,
    pub email_notifications: Option<bool>,
    pub time_format: Option<TimeFormat>,
    pub theme: Option<Theme>,
}

/// Administrative balance override (admin only).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOverrideInput {
    pub vacation_balance: Option<f64>,
    pub accrued_days: Option<f64>,
    pub used_days: Option<f64>,
}

impl Profile {
    pub fn new(user_id: String, province: Province, vacation_balance: f64) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            user_id,
            province,
            vacation_balance,
            accrued_days: vacation_balance,
            used_days: 0.0,
            email_notifications: true,
            time_format: TimeFormat::H24,
            theme: Theme::System,
            created_at: now,
            updated_at: now,
        }
    }

    /// Field-by-field merge of a partial update onto the current profile.
    pub fn merged_with(&self, update: &ProfileUpdateInput) -> Profile {
        Profile {
            province: update.province.unwrap_or(self.province),
            email_notifications: update
                .email_notifications
                .unwrap_or(self.email_notifications),
            time_format: update.time_format.unwrap_or(self.time_format),
            theme: update.theme.unwrap_or(self.theme),
            ..self.clone()
        }
    }
}
