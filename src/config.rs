use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for talking to the screening API, read from the environment
/// (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub log_level: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("SCREENER_API_URL must start with http:// or https:// (got '{0}')")]
    InvalidApiUrl(String),

    #[error("SCREENER_PAGE_SIZE must be a number between 1 and 100 (got '{0}')")]
    InvalidPageSize(String),

    #[error("SCREENER_TIMEOUT_SECS must be a positive number of seconds (got '{0}')")]
    InvalidTimeout(String),
}

impl ConsoleConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("SCREENER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_api_url(&api_url)?;

        let page_size = match lookup("SCREENER_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => n,
                _ => return Err(ConfigError::InvalidPageSize(raw)),
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout_secs = match lookup("SCREENER_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let log_level = lookup("SCREENER_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            api_url,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }

    /// Replace the API URL, e.g. from `--api-url`.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(url)?;
        Ok(self)
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidApiUrl(raw.to_string()))
    }
}
