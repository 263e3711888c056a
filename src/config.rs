//! Application configuration management.
//!
//! This module handles loading and saving the client configuration:
//! API base URL, the selected condominium scope, and offline mode.
//!
//! Configuration is stored at `~/.config/condocache/config.json`; the
//! `CONDOCACHE_API_URL` and `CONDOCACHE_CONDOMINIUM_ID` environment
//! variables (optionally via a `.env` file) override the stored values.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "condocache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub condominium_id: Option<String>,
    #[serde(default)]
    pub offline_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            condominium_id: None,
            offline_mode: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("CONDOCACHE_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(id) = std::env::var("CONDOCACHE_CONDOMINIUM_ID") {
            config.condominium_id = Some(id);
        }

        Ok(config)
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
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Cache directory, scoped per condominium when one is selected so
    /// switching scope never mixes entries.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;

        let mut path = cache_dir.join(APP_NAME);
        if let Some(ref id) = self.condominium_id {
            path = path.join(id);
        }
        Ok(path)
    }
}
