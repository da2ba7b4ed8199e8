//! Runtime configuration for the portal.
//!
//! Values come from `SCHOOLPORTAL_*` environment variables or a JSON
//! document; anything unset falls back to `PortalConfig::default()`.

use crate::logging::{default_log_level, init_logging};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SCHOOLPORTAL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SCHOOLPORTAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SCHOOLPORTAL_LOG_DIR";
pub const ENV_SEED: &str = "SCHOOLPORTAL_SEED";

const DEFAULT_DB_FILE_NAME: &str = "schoolportal.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// SQLite file backing the durable storage area.
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
    /// Seed absent collections with demo fixtures on init.
    pub seed_fixtures: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            seed_fixtures: true,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidFlag { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidFlag { key, value } => {
                write!(f, "`{key}` must be true|false|1|0, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidFlag { .. } => None,
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();
        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = get(ENV_SEED) {
            config.seed_fixtures = parse_flag(ENV_SEED, &flag)?;
        }
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Json)
    }

    /// Starts file logging when `log_dir` is configured.
    pub fn init_logging(&self) -> Result<(), String> {
        let Some(dir) = self.log_dir.as_ref() else {
            return Ok(());
        };
        let dir = dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: {}", dir.display()))?;
        init_logging(&self.log_level, dir)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}
