use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_core::{SessionPolicy, DEFAULT_PAGE_LIMIT};
use scout_engine::{ApiSettings, DEFAULT_API_URL};
use scout_logging::DEFAULT_LOG_FILE;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "scout.ron";
pub const API_URL_ENV: &str = "SCOUT_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings for a session. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub api_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub page_limit: u32,
    pub refresh_scoped_on_status: bool,
    pub log_level: String,
    pub log_file: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval_ms: 1000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            refresh_scoped_on_status: true,
            log_level: "info".to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl ScoutConfig {
    /// Loads `path`, or `./scout.ron` when no path is given.
    ///
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILENAME), false),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::from_ron_str(&content).map_err(|message| ConfigError::Parse { path, message })
    }

    pub fn from_ron_str(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    /// Applies environment overrides through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            page_limit: self.page_limit.max(1),
            refresh_scoped_on_status: self.refresh_scoped_on_status,
        }
    }

    /// Zero is treated as one millisecond so the ticker stays valid.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
