//! Settings adapters

pub mod config_settings;

pub use config_settings::ConfigSettingsRepository;
