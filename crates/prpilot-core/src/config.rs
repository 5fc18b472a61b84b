use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REPLY_DELAY_MS: u64 = 500;
pub const API_URL_ENV: &str = "PRPILOT_API_URL";

/// User settings, stored as JSON under the platform config directory.
/// Unset fields fall back to the defaults above.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub remote_enabled: Option<bool>,
    pub reply_delay_ms: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            remote_enabled: Some(true),
            reply_delay_ms: Some(DEFAULT_REPLY_DELAY_MS),
            download_dir: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// A missing file is not an error; it yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("prpilot"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Apply `PRPILOT_API_URL` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.apply_api_url_override(Some(url));
        }
    }

    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = Some(url.trim().to_string());
        }
    }

    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote_enabled.unwrap_or(true)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms.unwrap_or(DEFAULT_REPLY_DELAY_MS))
    }

    /// Where downloads land; the current directory unless configured.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
