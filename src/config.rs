//! Runtime configuration read from the environment

use std::time::Duration;

use log::LevelFilter;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PROXY_URL: &str = "https://proxy.golang.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const PROXY_ENV: &str = "GOPROXY";
pub const TIMEOUT_ENV: &str = "MODDOC_TIMEOUT_SECS";
pub const LOG_LEVEL_ENV: &str = "MODDOC_LOG_LEVEL";
pub const TOKEN_ENV: &str = "MODDOC_PROXY_TOKEN";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("proxy URL {0:?} is not usable, set GOPROXY to an http(s) proxy")]
    UnusableProxy(String),

    #[error("invalid proxy URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Proxy base URL without a trailing slash
    pub proxy_url: String,
    pub request_timeout: Duration,
    pub log_level: LevelFilter,
    /// Bearer token sent to the proxy, if any
    pub auth_token: Option<String>,
}

impl Config {
    /// Defaults for the given proxy
    pub fn new(proxy_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            proxy_url: parse_proxy_url(proxy_url)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: LevelFilter::Info,
            auth_token: None,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from a variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(&get(PROXY_ENV).unwrap_or_else(|| DEFAULT_PROXY_URL.to_string()))?;

        if let Some(value) = get(TIMEOUT_ENV) {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: TIMEOUT_ENV,
                    value: value.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = get(LOG_LEVEL_ENV) {
            config.log_level = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: LOG_LEVEL_ENV,
                value: value.clone(),
            })?;
        }

        config.auth_token = get(TOKEN_ENV).map(|token| token.trim().to_string());
        Ok(config)
    }
}

/// Pick the proxy to use from a GOPROXY-style list.
///
/// Only the first comma separated entry is used. `direct` and `off` have no
/// proxy to talk to and are rejected.
pub fn parse_proxy_url(value: &str) -> Result<String, ConfigError> {
    let first = value.split(',').next().unwrap_or_default().trim();
    if first.is_empty() || first == "direct" || first == "off" {
        return Err(ConfigError::UnusableProxy(value.to_string()));
    }

    let url = Url::parse(first).map_err(|e| ConfigError::InvalidUrl {
        url: first.to_string(),
        message: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl {
            url: first.to_string(),
            message: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(first.trim_end_matches('/').to_string())
}
