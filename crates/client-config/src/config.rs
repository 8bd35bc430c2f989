//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base URL (can be overridden at compile time via SCREENER_API_URL env var).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("SCREENER_API_URL") {
    Some(url) => url,
    None => "http://localhost:5000/api",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Base URL of the scoring/storage service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("SCREENER_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(api_url) = std::env::var("SCREENER_API_URL") {
            self.api_base_url = api_url;
        }
    }

    /// Get the API base URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }
}
