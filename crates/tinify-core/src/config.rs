//! Configuration module
//!
//! Client settings read from the environment (and `.env`): service location,
//! timeouts, and where the credential record lives.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.tinify.ai";

const COMPLETION_TIMEOUT_MS: u64 = 60_000;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const SESSION_DIR_NAME: &str = ".tinify";

#[derive(Clone, Debug)]
pub struct TinifyConfig {
    /// Service base URL without a trailing slash
    pub base_url: String,
    /// Budget for the completion wait
    pub completion_timeout: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Directory holding the credential record
    pub session_dir: PathBuf,
}

impl Default for TinifyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            completion_timeout: Duration::from_millis(COMPLETION_TIMEOUT_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            session_dir: PathBuf::from(SESSION_DIR_NAME),
        }
    }
}

impl TinifyConfig {
    /// Load from process environment after reading `.env` if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = var("TINIFY_API_URL")
            .or_else(|| var("API_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let completion_timeout_ms = match var("TINIFY_COMPLETION_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("TINIFY_COMPLETION_TIMEOUT_MS must be a valid number")
            })?,
            None => COMPLETION_TIMEOUT_MS,
        };

        let request_timeout_secs = var("TINIFY_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(REQUEST_TIMEOUT_SECS);

        let session_dir = var("TINIFY_SESSION_DIR")
            .map(PathBuf::from)
            .or_else(|| {
                var("HOME")
                    .or_else(|| var("USERPROFILE"))
                    .map(|home| PathBuf::from(home).join(SESSION_DIR_NAME))
            })
            .unwrap_or_else(|| PathBuf::from(SESSION_DIR_NAME));

        let config = Self {
            base_url,
            completion_timeout: Duration::from_millis(completion_timeout_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            session_dir,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "TINIFY_API_URL must start with http:// or https://"
            ));
        }

        if self.completion_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "TINIFY_COMPLETION_TIMEOUT_MS must be greater than zero"
            ));
        }

        Ok(())
    }
}
