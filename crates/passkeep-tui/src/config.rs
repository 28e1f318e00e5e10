//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds the vault endpoint override and the last used sign-in
//! email.
//!
//! Configuration is stored at `~/.config/passkeep/config.json`; the
//! session file, device key, and logs live under the data directory.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "passkeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Vault endpoint used when neither the environment nor the config file
/// overrides it
const DEFAULT_ENDPOINT: &str = "http://localhost:8080/query";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub endpoint: Option<String>,
    pub last_email: Option<String>,
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

    /// The vault endpoint.
    /// PASSKEEP_ENDPOINT beats the config file, which beats the default.
    pub fn endpoint(&self) -> String {
        if let Ok(endpoint) = std::env::var("PASSKEEP_ENDPOINT") {
            if !endpoint.is_empty() {
                return endpoint;
            }
        }
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file, device key, and logs
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
