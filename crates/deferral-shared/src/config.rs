//! Configuration management

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_LOG_FILE_PREFIX, DEFAULT_LOG_LEVEL, DEFAULT_MEMBERSHIP_CATEGORY_SLUG};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub deferral: DeferralConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            env: "development".into(),
            name: "deferral".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
    /// Directory for the rolling log file. Console only when unset.
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.into(),
            json: false,
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.into(),
        }
    }
}

/// Stored feature settings. Everything absent means "off".
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeferralConfig {
    pub enabled: bool,
    pub eligible_categories: Vec<u64>,
    pub surfaces: Vec<String>,
    /// Order status slug -> trigger flag.
    pub trigger_statuses: BTreeMap<String, bool>,
    pub membership_category_slugs: Vec<String>,
    pub display_date_format: Option<String>,
}

impl Default for DeferralConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            eligible_categories: Vec::new(),
            surfaces: Vec::new(),
            trigger_statuses: BTreeMap::new(),
            membership_category_slugs: vec![DEFAULT_MEMBERSHIP_CATEGORY_SLUG.into()],
            display_date_format: None,
        }
    }
}

impl AppConfig {
    /// Load `default` and `{APP_ENV}` files from `dir`, then `DEFERRAL__*` env vars.
    ///
    /// A `.env` file in the working directory is applied to the environment first.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.clone())?
            .set_default("app.name", "deferral")?
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join(&env).to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("DEFERRAL").separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
