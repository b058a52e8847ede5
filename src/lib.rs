pub mod app;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod email;
pub mod telemetry;
