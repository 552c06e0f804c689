pub mod auth;
pub mod notifications;

pub use auth::{AuthService, Claims};
pub use notifications::{NotificationKind, Notifier};
