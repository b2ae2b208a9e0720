use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_API_KEY_ENV: &str = "EXCHANGERATE_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FiatBackend {
    /// Keyless `latest?base=` endpoint returning a full rate table.
    #[default]
    ExchangerateHost,
    /// Keyed pair endpoint returning `conversion_rate`.
    ExchangerateApi,
}

impl FiatBackend {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            FiatBackend::ExchangerateHost => "https://api.exchangerate.host",
            FiatBackend::ExchangerateApi => "https://v6.exchangerate-api.com/v6",
        }
    }
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FiatProviderConfig {
    #[serde(default)]
    pub backend: FiatBackend,
    /// Falls back to the backend's public endpoint.
    pub base_url: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl FiatProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
    }
}

impl Default for FiatProviderConfig {
    fn default() -> Self {
        FiatProviderConfig {
            backend: FiatBackend::default(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CryptoProviderConfig {
    pub base_url: String,
}

impl Default for CryptoProviderConfig {
    fn default() -> Self {
        CryptoProviderConfig {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub fiat: FiatProviderConfig,
    #[serde(default)]
    pub crypto: CryptoProviderConfig,
}

fn default_currency() -> CurrencyCode {
    CurrencyCode::new("THB")
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Destination used when a fiat query names no target.
    #[serde(default = "default_currency")]
    pub default_currency: CurrencyCode,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_currency: default_currency(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "fxq").context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
