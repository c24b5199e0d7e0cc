//! TUI configuration persistence
//!
//! Session timings, the portal API location and where the session store
//! lives.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vigil_core::SessionConfig;

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Directory name under the config and data roots
const APP_DIR_NAME: &str = "vigil";

/// Session store file name
const STORE_FILE_NAME: &str = "session.json";

/// TUI configuration that persists across runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Idle timeout and warning timings
    #[serde(default)]
    pub session: SessionConfig,

    /// Base URL of the portal API, used for the logout notice
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Session store location; defaults under the user data directory
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            api_base_url: default_api_base_url(),
            store_path: None,
        }
    }
}

impl TuiConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        // Try XDG_CONFIG_HOME first, then fall back to the platform default
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(APP_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(APP_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Directory for the session store and log file
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join(APP_DIR_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default configuration if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let config: Self = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config file: {}", e);
                Self::default()
            }
        };

        if let Err(e) = config.session.validate() {
            tracing::warn!("Invalid session timings, using defaults: {}", e);
            return Self {
                session: SessionConfig::default(),
                ..config
            };
        }
        config
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_file_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
            }
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Where the session store lives
    pub fn resolved_store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Self::data_dir()
                .map(|d| d.join(STORE_FILE_NAME))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    /// Server endpoint that ends a session
    pub fn logout_url(&self) -> String {
        format!("{}/api/login/logout", self.api_base_url.trim_end_matches('/'))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}
