pub mod profile;
pub mod stats;
pub mod timesheet;
pub mod user;
pub mod vacation;

pub use profile::ProfileRepository;
pub use stats::StatsRepository;
pub use timesheet::TimesheetRepository;
pub use user::UserRepository;
pub use vacation::VacationRepository;
