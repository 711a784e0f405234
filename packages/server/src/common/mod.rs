pub mod auth;
pub mod cookies;
pub mod telemetry;
