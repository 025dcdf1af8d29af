use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_BASE_URL: &str = "REPOSEARCH_BASE_URL";
pub const ENV_ACCEPT: &str = "REPOSEARCH_ACCEPT";
pub const ENV_DEBOUNCE_MS: &str = "REPOSEARCH_DEBOUNCE_MS";
pub const ENV_TIMEOUT_MS: &str = "REPOSEARCH_TIMEOUT_MS";
pub const ENV_USER_AGENT: &str = "REPOSEARCH_USER_AGENT";

/// Settings injected into the fetch client and the search controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub accept_header: String,
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept_header: GITHUB_V3_ACCEPT.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Build a config from `REPOSEARCH_*` environment variables.
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, defaulting every missing key.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Ok(Config {
            base_url: lookup(ENV_BASE_URL).unwrap_or(defaults.base_url),
            accept_header: lookup(ENV_ACCEPT).unwrap_or(defaults.accept_header),
            debounce_ms: get_millis_or_default(&lookup, ENV_DEBOUNCE_MS, defaults.debounce_ms)?,
            request_timeout_ms: get_millis_or_default(
                &lookup,
                ENV_TIMEOUT_MS,
                defaults.request_timeout_ms,
            )?,
            user_agent: lookup(ENV_USER_AGENT).unwrap_or(defaults.user_agent),
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_user_agent() -> String {
    format!("reposearch/{}", env!("CARGO_PKG_VERSION"))
}

fn get_millis_or_default<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}
