use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::utils::{app_data_dir, app_id_from_env, config_file_in, data_dir_in},
    currency::CurrencyCode,
    storage::{json_backend::write_atomic, DEFAULT_STORAGE_KEY},
};

pub const DEFAULT_RATES_ENDPOINT: &str = "https://openexchangerates.org/api/latest.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

/// Stores user-configurable preferences for the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub display_currency: CurrencyCode,
    #[serde(default = "Config::default_storage_key")]
    pub storage_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for snapshot slots. Defaults to `<app dir>/data`.
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub rates: RatesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_currency: CurrencyCode::default(),
            storage_key: Self::default_storage_key(),
            data_dir: None,
            rates: RatesConfig::default(),
        }
    }
}

impl Config {
    fn default_storage_key() -> String {
        DEFAULT_STORAGE_KEY.to_string()
    }

    /// Snapshot directory, resolved against `base` when not configured.
    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| data_dir_in(base))
    }

    /// Fills deployment-time values that are never written to disk.
    pub fn apply_env(mut self) -> Self {
        if let Some(app_id) = app_id_from_env() {
            self.rates.app_id = Some(app_id);
        }
        self
    }
}

/// Exchange rate service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatesConfig {
    #[serde(default = "RatesConfig::default_endpoint")]
    pub endpoint: String,
    /// Credential for the rate service; normally injected via the environment.
    #[serde(default, skip_serializing)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub base_currency: CurrencyCode,
    #[serde(default = "RatesConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Route requests through proxies named by `HTTP_PROXY`/`HTTPS_PROXY`.
    #[serde(default = "RatesConfig::default_use_system_proxy")]
    pub use_system_proxy: bool,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            app_id: None,
            base_currency: CurrencyCode::default(),
            timeout_secs: Self::default_timeout_secs(),
            use_system_proxy: Self::default_use_system_proxy(),
        }
    }
}

impl RatesConfig {
    fn default_endpoint() -> String {
        DEFAULT_RATES_ENDPOINT.to_string()
    }

    fn default_timeout_secs() -> u64 {
        10
    }

    fn default_use_system_proxy() -> bool {
        true
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager rooted at the default application directory.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        let config_path = config_file_in(&base);
        Ok(Self { base, config_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let config = if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?
        } else {
            Config::default()
        };
        Ok(config.apply_env())
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.config_path, &json)?;
        Ok(())
    }
}
