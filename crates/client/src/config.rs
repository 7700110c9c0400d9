//! Client configuration loaded from the environment.

use std::time::Duration;

use thiserror::Error;

use crate::client::DEFAULT_API_URL;

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

pub const API_URL_ENV: &str = "NUTRIKART_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "NUTRIKART_REQUEST_TIMEOUT_MS";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {name}: '{value}' ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ClientConfig {
    /// Reads `NUTRIKART_API_URL` and `NUTRIKART_REQUEST_TIMEOUT_MS`, after
    /// loading a `.env` file if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(API_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        reqwest::Url::parse(&api_url).map_err(|e| ConfigError::InvalidValue {
            name: API_URL_ENV,
            value: api_url.clone(),
            reason: e.to_string(),
        })?;

        let timeout_ms = match lookup(REQUEST_TIMEOUT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: REQUEST_TIMEOUT_ENV,
                    value: raw.clone(),
                    reason: "expected a positive number of milliseconds".to_string(),
                })?,
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        Ok(Self {
            api_url,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
