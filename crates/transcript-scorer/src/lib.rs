pub mod config;
pub mod error;
pub mod integrations;
pub mod projects;
pub mod scoring;
pub mod telemetry;
