use crate::style_url::DEFAULT_STYLE_SERVICE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:5173/";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where share links point and which style service renders them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaygroundConfig {
    /// Playground page that share links open
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,
    #[serde(default = "default_style_service_url")]
    pub style_service_url: String,
}

fn default_share_base_url() -> String {
    DEFAULT_SHARE_BASE_URL.to_string()
}

fn default_style_service_url() -> String {
    DEFAULT_STYLE_SERVICE_URL.to_string()
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            share_base_url: default_share_base_url(),
            style_service_url: default_style_service_url(),
        }
    }
}

impl PlaygroundConfig {
    pub fn load() -> Self {
        let dev_mode = std::env::var("PLAYGROUND_DEV_MODE").is_ok() || dotenvy::dotenv().is_ok();
        if dev_mode {
            info!("Dev mode activated - loading from .env");
            Self::from_env()
        } else {
            match Self::config_dir() {
                Some(dir) => Self::load_from_dir(&dir),
                None => {
                    warn!("No config directory on this platform, using defaults");
                    Self::default()
                }
            }
        }
    }

    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|s| !s.is_empty());

        Self {
            share_base_url: var("PLAYGROUND_SHARE_BASE_URL")
                .unwrap_or_else(default_share_base_url),
            style_service_url: var("PLAYGROUND_STYLE_SERVICE_URL")
                .unwrap_or_else(default_style_service_url),
        }
    }

    /// `~/.config/basemap-playground` on Linux, the platform equivalent elsewhere.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("basemap-playground"))
    }

    fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join("config.yaml");
        if !config_path.exists() {
            info!(
                "No config.yaml at {}, using defaults",
                config_path.display()
            );
            return Self::default();
        }

        info!("Loading config from {}", config_path.display());
        match Self::from_yaml_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
