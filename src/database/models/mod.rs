pub mod macros;
pub mod profile;
pub mod stats;
pub mod timesheet;
pub mod user;
pub mod vacation;

pub use profile::{
    BalanceOverrideInput, Profile, ProfileUpdateInput, Province, Theme, TimeFormat,
};
pub use stats::{AdminStats, DashboardStats, EmployeeStats, ManagerStats, RoleBreakdown};
pub use timesheet::{
    derive_week, ReviewInput, Timesheet, TimesheetEditInput, TimesheetEntry, TimesheetEntryInput,
    TimesheetInput, TimesheetStatus, TimesheetWithEntries,
};
pub use user::{AuthResponse, CreateUserRequest, LoginRequest, User, UserInfo, UserRole};
pub use vacation::{
    days_requested, ranges_overlap, VacationRequest, VacationRequestInput, VacationStatus,
    VacationType,
};
