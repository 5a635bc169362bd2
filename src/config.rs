//! User configuration
//!
//! Stored in ~/.config/dead-dl/config.json. Every key is optional; a missing
//! file means defaults. Command-line flags override what is loaded here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::sync::FormatMode;

const CONFIG_FILE: &str = "config.json";

/// Persistent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relisten API base URL
    pub catalog_url: String,
    /// archive.org base URL
    pub archive_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Pause between file transfers, in milliseconds
    pub request_delay_ms: u64,
    /// Directory for run logs
    pub log_dir: PathBuf,
    /// Default band slug
    pub band: String,
    /// Default output directory
    pub output_dir: PathBuf,
    /// Default format
    pub format: FormatMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: "https://api.relisten.net/api/v2".to_string(),
            archive_url: "https://archive.org".to_string(),
            user_agent: concat!("dead-dl/", env!("CARGO_PKG_VERSION")).to_string(),
            request_delay_ms: 100,
            log_dir: PathBuf::from("./logs"),
            band: "grateful-dead".to_string(),
            output_dir: PathBuf::from("./downloads"),
            format: FormatMode::Mp3,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Some(p) => p,
                None => {
                    debug!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!("No config found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dead-dl").join(CONFIG_FILE))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
