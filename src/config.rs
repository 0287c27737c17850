//! Runtime configuration.
//!
//! The only externally visible setting is the backend base URL.

use reqwest::Url;
use thiserror::Error;

pub const API_URL_ENV: &str = "OCR_DESK_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{0}': {1}")]
    InvalidUrl(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let raw = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::with_api_url(&raw)
    }

    pub fn with_api_url(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(
                raw.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(Self {
            api_url: trimmed.to_string(),
        })
    }
}
