pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use services::{AuthService, Notifier};

pub struct AppState {
    pub auth_service: AuthService,
}
