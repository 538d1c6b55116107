//! RON configuration for the backend client

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Backend root, e.g. "https://idlerealm.example"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the bearer token is persisted; memory only when absent
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Player state polling period in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Hold-to-repeat: wait before the first repeat
    #[serde(default = "default_hold_delay")]
    pub hold_delay_ms: u64,
    /// Hold-to-repeat: period between repeats
    #[serde(default = "default_hold_interval")]
    pub hold_interval_ms: u64,
    /// Rows requested per admin list page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_poll_interval() -> u64 {
    1_000
}

fn default_hold_delay() -> u64 {
    400
}

fn default_hold_interval() -> u64 {
    100
}

fn default_page_size() -> u32 {
    50
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_path: None,
            request_timeout_ms: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            hold_delay_ms: default_hold_delay(),
            hold_interval_ms: default_hold_interval(),
            page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron(&content)
    }

    /// Parse configuration from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let mut config: ClientConfig = ron::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn hold_delay(&self) -> Duration {
        Duration::from_millis(self.hold_delay_ms)
    }

    pub fn hold_interval(&self) -> Duration {
        Duration::from_millis(self.hold_interval_ms)
    }
}
