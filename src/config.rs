//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` (or the path in `WEATHER_RELAY_CONFIG`) and
//! deserializes into strongly-typed structs. The WeatherAPI key is
//! referenced by env-var name and resolved once at startup.

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use crate::upstream::ProviderSettings;

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Env var overriding `DEFAULT_CONFIG_PATH`.
pub const CONFIG_PATH_ENV: &str = "WEATHER_RELAY_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// WeatherAPI.com current-conditions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the env var holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_base_url() -> String {
    "http://api.weatherapi.com/v1/current.json".to_string()
}

fn default_api_key_env() -> String {
    "WEATHERAPI_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `WEATHER_RELAY_CONFIG` if set, else `config.toml`.
    pub fn load_default() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.provider.base_url.trim().is_empty() {
            bail!("provider.base_url must not be empty");
        }
        if self.provider.timeout_secs == 0 {
            bail!("provider.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Address the relay listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address: {}:{}",
                    self.server.host, self.server.port
                )
            })
    }

    /// Immutable provider settings, with the API key resolved from the env.
    pub fn provider_settings(&self) -> Result<ProviderSettings> {
        let api_key = Self::resolve_env(&self.provider.api_key_env)?;
        self.provider_settings_with_key(api_key)
    }

    pub fn provider_settings_with_key(&self, api_key: String) -> Result<ProviderSettings> {
        if api_key.trim().is_empty() {
            bail!(
                "WeatherAPI key is empty (env var {})",
                self.provider.api_key_env
            );
        }
        Ok(ProviderSettings {
            base_url: self.provider.base_url.clone(),
            api_key: SecretString::new(api_key),
            timeout: Duration::from_secs(self.provider.timeout_secs),
        })
    }
}
