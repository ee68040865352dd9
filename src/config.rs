//! Environment-driven settings.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SOURCE_URL: &str = "https://localhost/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_FLAG_LOG: &str = "data/flagged/flags.jsonl";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the model server; `/predict` is appended.
    pub prediction_api_url: String,
    /// Placeholder sent in the `url` field of every request.
    pub source_url: String,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub flag_log_path: PathBuf,
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prediction_api_url = lookup("PREDICTION_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let source_url =
            lookup("PREDICTION_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());

        let request_timeout = match lookup("PREDICTION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "PREDICTION_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: "PREDICTION_TIMEOUT_SECS",
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let flag_log_path = lookup("FLAG_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FLAG_LOG));

        Ok(Self {
            prediction_api_url,
            source_url,
            request_timeout,
            bind_addr,
            flag_log_path,
        })
    }
}
