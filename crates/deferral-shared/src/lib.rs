//! # Deferral Shared
//! 
//! Configuration, telemetry, and constants shared by the deferral crates.

pub mod constants;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::{AppConfig, DeferralConfig, LoggingSettings};
pub use error::AppError;
