use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BazaarError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "BAZAAR_API_URL";

/// Environment variable overriding the base directory
pub const BASE_DIR_ENV: &str = "BAZAAR_BASE";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# plugin-bazaar configuration file
# Location: ~/.plugin-bazaar/config.toml

[api]
# Origin of the marketplace API (requests go to <base_url>/api/...)
# Overridden by the BAZAAR_API_URL environment variable or --api-url
base_url = "http://localhost:5000"

# Per-request timeout in seconds (0 disables the timeout)
timeout_secs = 30

[download]
# Directory where downloaded plugin jars are saved
# Default: current directory
# Example: dir = "~/minecraft/plugins"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DownloadConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| BazaarError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Resolve the API origin: explicit override, then environment, then file.
    pub fn api_base_url(&self, cli_override: Option<&str>) -> String {
        if let Some(url) = cli_override {
            return url.to_string();
        }

        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.api.base_url.clone(),
        }
    }

    /// Directory for downloaded jars, with a leading `~` expanded
    pub fn download_dir(&self) -> PathBuf {
        match &self.download.dir {
            Some(dir) => expand_home(dir),
            None => PathBuf::from("."),
        }
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.base_url" => Some(self.api.base_url.clone()),
            "api.timeout_secs" => Some(self.api.timeout_secs.to_string()),
            "download.dir" => Some(self.download.dir.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                let trimmed = value.trim();
                url::Url::parse(trimmed).map_err(|_| BazaarError::InvalidConfigValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                self.api.base_url = trimmed.trim_end_matches('/').to_string();
                Ok(())
            }
            "api.timeout_secs" => {
                self.api.timeout_secs =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| BazaarError::InvalidConfigValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
                Ok(())
            }
            "download.dir" => {
                let trimmed = value.trim();
                self.download.dir = if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                };
                Ok(())
            }
            _ => Err(BazaarError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        ["api.base_url", "api.timeout_secs", "download.dir"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

/// Default base directory: `$BAZAAR_BASE`, else `~/.plugin-bazaar`
pub fn default_base_dir() -> Result<PathBuf> {
    if let Ok(base) = std::env::var(BASE_DIR_ENV) {
        return Ok(PathBuf::from(base));
    }

    dirs::home_dir()
        .map(|h| h.join(".plugin-bazaar"))
        .ok_or(BazaarError::HomeNotFound)
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
