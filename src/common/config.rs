use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::common::errors::{ConsoleError, Result};

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: Url,
    pub data_dir: PathBuf,
    pub local_store_file: String,
    pub request_timeout: Option<Duration>, // None = no timeout
    pub log_level: String,
    pub keyring_fallback: bool,
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup, so callers (and tests)
    /// don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("API_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string());
        let api_base_url = Url::parse(&raw_url)
            .map_err(|e| ConsoleError::Config(format!("API_BASE_URL '{}': {}", raw_url, e)))?;

        let timeout_secs = lookup("REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()).unwrap_or(30);

        Ok(Self {
            api_base_url,
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data")),
            local_store_file: lookup("LOCAL_STORE_FILE").unwrap_or_else(|| "console_store.json".to_string()),
            request_timeout: if timeout_secs == 0 { None } else { Some(Duration::from_secs(timeout_secs)) },
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            keyring_fallback: lookup("KEYRING_FALLBACK").map(|v| v == "true" || v == "1").unwrap_or(false),
        })
    }

    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join(&self.local_store_file)
    }
}
