// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DIRECTORY_URL: &str = "https://www.kayak.com/h/mobileapis/directory/airlines";
pub const DEFAULT_LOGO_BASE_URL: &str = "https://www.kayak.com/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Airline directory endpoint
    pub directory_url: String,

    /// Prefix for airline logo paths
    pub logo_base_url: String,

    /// SQLite database path for the airline store
    pub store_db_path: PathBuf,

    /// Local API bind address (e.g., "127.0.0.1:8080")
    pub local_api_bind: SocketAddr,

    /// Timeout for the directory request in seconds
    pub request_timeout_secs: u64,

    /// Run an initial load when the daemon starts
    pub load_on_startup: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("AIRLINES_CONFIG")
            .unwrap_or_else(|_| "config.toml".to_string());

        let mut config = Self::from_file(Path::new(&config_path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file, or fall back to defaults when it does not exist
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Apply `AIRLINES_*` overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("AIRLINES_DIRECTORY_URL") {
            self.directory_url = val;
        }
        if let Some(val) = lookup("AIRLINES_LOGO_BASE_URL") {
            self.logo_base_url = val;
        }
        if let Some(val) = lookup("AIRLINES_STORE_DB_PATH") {
            self.store_db_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("AIRLINES_LOCAL_API_BIND") {
            self.local_api_bind = SocketAddr::from_str(&val)?;
        }
        if let Some(val) = lookup("AIRLINES_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = val.parse()?;
        }
        if let Some(val) = lookup("AIRLINES_LOAD_ON_STARTUP") {
            self.load_on_startup = val.parse()?;
        }
        if let Some(val) = lookup("AIRLINES_LOG_LEVEL") {
            self.log_level = val;
        }
        if let Some(val) = lookup("AIRLINES_LOG_JSON") {
            self.log_json = val.parse()?;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_url: String::from(DEFAULT_DIRECTORY_URL),
            logo_base_url: String::from(DEFAULT_LOGO_BASE_URL),
            store_db_path: PathBuf::from("airlines.db"),
            local_api_bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            request_timeout_secs: 30,
            load_on_startup: true,
            log_level: String::from("info"),
            log_json: false,
        }
    }
}
