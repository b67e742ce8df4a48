pub mod auth;
pub mod ids;
pub mod uploads;
