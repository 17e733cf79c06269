//! Sync settings parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
/// Client-side bound on one long-poll; sits just above the server's own cap.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 35;
/// Fixed pause before every refresh request, success or failure.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Server origin without a trailing slash.
    pub base_url: String,
    pub poll_timeout: Duration,
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PIXELBOARD_BASE_URL`: default `http://127.0.0.1:8080`
    /// - `PIXELBOARD_POLL_TIMEOUT_SECS`: default 35
    /// - `PIXELBOARD_RETRY_DELAY_MS`: default 1000
    /// - `PIXELBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PIXELBOARD_WRITE_TIMEOUT_SECS`: default 10
    ///
    /// Unparseable numbers fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("PIXELBOARD_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_timeout: Duration::from_secs(env_parse("PIXELBOARD_POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)),
            retry_delay: Duration::from_millis(env_parse("PIXELBOARD_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)),
            connect_timeout: Duration::from_secs(env_parse(
                "PIXELBOARD_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            write_timeout: Duration::from_secs(env_parse("PIXELBOARD_WRITE_TIMEOUT_SECS", DEFAULT_WRITE_TIMEOUT_SECS)),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
