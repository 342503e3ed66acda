//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_STORAGE_PATH: &str = ".careerprep/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API URL '{0}': expected http:// or https://")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL that endpoint paths such as `/auth/login` are appended to.
    pub api_url: String,
    /// File backing the durable token/role keys.
    pub storage_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Config pointed at `api_url` with default storage and timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an http(s) URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CAREERPREP_API_URL`: default `http://localhost:3000/api`
    /// - `CAREERPREP_STORAGE_PATH`: default `.careerprep/session.json`
    /// - `CAREERPREP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CAREERPREP_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// Timeouts that are not positive integers fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `CAREERPREP_API_URL` is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("CAREERPREP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let storage_path = std::env::var("CAREERPREP_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));
        let timeouts = Timeouts {
            request_secs: env_parse_u64("CAREERPREP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("CAREERPREP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_url: normalize_api_url(&api_url)?, storage_path, timeouts })
    }

    /// Replace the base URL, keeping storage and timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an http(s) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(self)
    }

    /// Join an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Positive integer from `key`; unset, unparseable, or zero yields `default`.
fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
