//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const STATE_DIR: &str = ".sweetshop";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    pub api_url: String,
    pub state_file: PathBuf,
    pub timeouts: Timeouts,
}

impl ShopConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SWEETSHOP_API_URL`: REST base URL, default `http://127.0.0.1:8000/api`
    /// - `SWEETSHOP_STATE_FILE`: durable storage file, default `$HOME/.sweetshop/state.json`
    /// - `SWEETSHOP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SWEETSHOP_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = std::env::var("SWEETSHOP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let state_file = std::env::var_os("SWEETSHOP_STATE_FILE")
            .map_or_else(|| default_state_file(std::env::var_os("HOME").map(PathBuf::from)), PathBuf::from);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("SWEETSHOP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SWEETSHOP_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self::new(api_url, state_file, timeouts)
    }

    #[must_use]
    pub fn new(api_url: impl Into<String>, state_file: impl Into<PathBuf>, timeouts: Timeouts) -> Self {
        let api_url: String = api_url.into();
        Self { api_url: api_url.trim_end_matches('/').to_owned(), state_file: state_file.into(), timeouts }
    }
}

fn default_state_file(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_default().join(STATE_DIR).join(STATE_FILE)
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
