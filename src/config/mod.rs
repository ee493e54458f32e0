//! Environment-backed configuration.
//!
//! Credentials come from `HF_API_TOKEN` and `TELEGRAM_TOKEN`; everything else has a
//! default and can be overridden with `HF_*` / `RELAY_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_CAPACITY, DEFAULT_MODEL, DEFAULT_POLLING_PROMPT_LIMIT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TELEGRAM_API_URL, DEFAULT_WEBHOOK_PROMPT_LIMIT,
};

/// Relay configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults, then
/// [`Config::validate`] before wiring collaborators.
#[derive(Clone)]
pub struct Config {
    /// Inference API token (`HF_API_TOKEN`). Required.
    pub hf_token: Option<String>,

    /// Model identifier sent with every completion. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// OpenAI-compatible base URL. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Telegram bot token (`TELEGRAM_TOKEN`). Required.
    pub telegram_token: Option<String>,

    /// Telegram Bot API base URL. Default: [`DEFAULT_TELEGRAM_API_URL`].
    pub telegram_api_url: String,

    /// HTTP server port (`RELAY_PORT`, else the platform's `PORT`). Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    ///
    /// Hosted webhook deployments must set `RELAY_BIND_ADDR=0.0.0.0` to be reachable.
    pub bind_addr: IpAddr,

    /// Max entries in the query cache. Default: `500`.
    pub cache_capacity: usize,

    /// Timeout applied to each inference request. Default: 60s.
    pub request_timeout: Duration,

    /// Prompt character limit for webhook updates. Default: `800`.
    pub webhook_prompt_limit: usize,

    /// Prompt character limit for polled updates. Default: `1000`.
    pub polling_prompt_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hf_token: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            telegram_token: None,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            webhook_prompt_limit: DEFAULT_WEBHOOK_PROMPT_LIMIT,
            polling_prompt_limit: DEFAULT_POLLING_PROMPT_LIMIT,
        }
    }
}

impl Config {
    const ENV_HF_TOKEN: &'static str = "HF_API_TOKEN";
    const ENV_MODEL: &'static str = "HF_MODEL";
    const ENV_BASE_URL: &'static str = "HF_BASE_URL";
    const ENV_TELEGRAM_TOKEN: &'static str = "TELEGRAM_TOKEN";
    const ENV_TELEGRAM_API_URL: &'static str = "TELEGRAM_API_URL";
    pub const ENV_PORT: &'static str = "RELAY_PORT";
    /// Port variable set by hosting platforms (Heroku, Railway); used when `RELAY_PORT` is unset.
    pub const ENV_PLATFORM_PORT: &'static str = "PORT";
    const ENV_BIND_ADDR: &'static str = "RELAY_BIND_ADDR";
    const ENV_CACHE_CAPACITY: &'static str = "RELAY_CACHE_CAPACITY";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "RELAY_REQUEST_TIMEOUT_SECS";
    const ENV_WEBHOOK_PROMPT_LIMIT: &'static str = "RELAY_WEBHOOK_PROMPT_LIMIT";
    const ENV_POLLING_PROMPT_LIMIT: &'static str = "RELAY_POLLING_PROMPT_LIMIT";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Missing credentials are not an error here; see [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let hf_token = Self::parse_optional_string_from_env(Self::ENV_HF_TOKEN);
        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let base_url = Self::parse_string_from_env(Self::ENV_BASE_URL, defaults.base_url);
        let telegram_token = Self::parse_optional_string_from_env(Self::ENV_TELEGRAM_TOKEN);
        let telegram_api_url =
            Self::parse_string_from_env(Self::ENV_TELEGRAM_API_URL, defaults.telegram_api_url);
        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let cache_capacity =
            Self::parse_usize_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);
        let request_timeout = env::var(Self::ENV_REQUEST_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let webhook_prompt_limit = Self::parse_usize_from_env(
            Self::ENV_WEBHOOK_PROMPT_LIMIT,
            defaults.webhook_prompt_limit,
        );
        let polling_prompt_limit = Self::parse_usize_from_env(
            Self::ENV_POLLING_PROMPT_LIMIT,
            defaults.polling_prompt_limit,
        );

        Ok(Self {
            hf_token,
            model,
            base_url,
            telegram_token,
            telegram_api_url,
            port,
            bind_addr,
            cache_capacity,
            request_timeout,
            webhook_prompt_limit,
            polling_prompt_limit,
        })
    }

    /// Checks that credentials are present and limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hf_token.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_HF_TOKEN,
            });
        }

        if self.telegram_token.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_TELEGRAM_TOKEN,
            });
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MODEL,
                value: self.model.clone(),
                reason: "model id must not be empty",
            });
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_CACHE_CAPACITY,
                value: self.cache_capacity.to_string(),
                reason: "capacity must be at least 1",
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "timeout must be at least one second",
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT).or_else(|_| env::var(Self::ENV_PLATFORM_PORT)) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("hf_token", &self.hf_token.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field(
                "telegram_token",
                &self.telegram_token.as_ref().map(|_| "<redacted>"),
            )
            .field("telegram_api_url", &self.telegram_api_url)
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("cache_capacity", &self.cache_capacity)
            .field("request_timeout", &self.request_timeout)
            .field("webhook_prompt_limit", &self.webhook_prompt_limit)
            .field("polling_prompt_limit", &self.polling_prompt_limit)
            .finish()
    }
}
