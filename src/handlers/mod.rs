pub mod admin;
pub mod auth;
pub mod profile;
pub mod shared;
pub mod stats;
pub mod timesheets;
pub mod vacations;
