//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the portal base URL and the offline-mode flag.
//!
//! Configuration is stored at `~/.config/mathportal/config.json`. Learner
//! state (grade, progress, bookmarks) lives in the key-value store, not here.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "mathportal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default portal origin probed for lesson pages and cached assets.
const DEFAULT_BASE_URL: &str = "https://math.qla.example.org";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub portal_base_url: Option<String>,
    #[serde(default)]
    pub offline_mode: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Base URL for probes and cache fills. The `PORTAL_BASE_URL` environment
    /// variable overrides the config file.
    pub fn base_url(&self) -> String {
        std::env::var("PORTAL_BASE_URL")
            .ok()
            .or_else(|| self.portal_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Directory for the learner's key-value store.
    pub fn store_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("store"))
    }

    /// Root directory for the offline cache partitions.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
