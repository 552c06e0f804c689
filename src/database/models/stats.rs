use serde::Serialize;

/// Year-to-date figures for the acting user. Missing sums default to zero.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total_timesheets: i64,
    pub draft_timesheets: i64,
    pub submitted_timesheets: i64,
    pub approved_timesheets: i64,
    pub rejected_timesheets: i64,
    pub total_hours: f64,
    pub vacation_days_used: f64,
    pub vacation_balance: f64,
    pub pending_vacation_requests: i64,
    pub approved_vacation_requests: i64,
}

/// Items awaiting the manager's review, excluding their own submissions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStats {
    pub timesheets_awaiting_review: i64,
    pub vacation_requests_awaiting_review: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBreakdown {
    pub employees: i64,
    pub managers: i64,
    pub admins: i64,
}

/// System-wide totals, admin dashboard only.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub users_by_role: RoleBreakdown,
    pub total_timesheets: i64,
    pub total_vacation_requests: i64,
    pub total_hours_logged: f64,
}

/// Role-scoped dashboard payload: the manager and admin sections are only
/// populated for sufficiently ranked callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub employee: EmployeeStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminStats>,
}
