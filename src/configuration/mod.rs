use crate::catalog::{Category, OperatorKey};
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;
use thiserror::Error;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File read error")]
    FileError,

    #[error("Deserialization error:{0}")]
    DeserializationError(String),

    #[error("Backend base url is not configured")]
    MissingBaseUrl,

    #[error("Invalid config value:{0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

// Values used to prefill creation forms
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub operator: OperatorKey,
    #[serde(default)]
    pub category: Category,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let config = Config::new(config_file)?.with_env_overrides()?;
        Ok(Self { config })
    }
}

impl Config {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(config_file).map_err(|_| ConfigError::FileError)?;
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(config_str)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        Ok(config)
    }

    /// Applies `BACKEND_URL` on top of the file value and validates the result.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = env::var(BACKEND_URL_VAR) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        self.api.base_url = self.api.base_url.trim().trim_end_matches('/').to_string();
        if self.api.base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "search.debounce_ms must be positive".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}
