//! Configuration file support for Moveplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/moveplan/config.toml`.

use crate::status::StatusRules;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub sports: Vec<SportOverride>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Workout status derivation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Completion percentage below which a done workout is partial
    #[serde(default = "default_partial_threshold")]
    pub partial_threshold: u8,

    #[serde(default = "default_current_window_days")]
    pub current_window_days: i64,

    #[serde(default = "default_next_window_days")]
    pub next_window_days: i64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            partial_threshold: default_partial_threshold(),
            current_window_days: default_current_window_days(),
            next_window_days: default_next_window_days(),
        }
    }
}

impl StatusConfig {
    pub fn rules(&self) -> StatusRules {
        StatusRules {
            partial_threshold: self.partial_threshold,
            current_window_days: self.current_window_days,
            next_window_days: self.next_window_days,
        }
    }
}

/// Sport taxonomy entry added or replaced by configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SportOverride {
    pub id: String,
    pub aerobic: bool,
    #[serde(default)]
    pub distance_unit: Option<String>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("moveplan")
}

fn default_partial_threshold() -> u8 {
    75
}

fn default_current_window_days() -> i64 {
    7
}

fn default_next_window_days() -> i64 {
    14
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("moveplan").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the engines cannot use
    fn check(&self) -> Result<()> {
        let status = &self.status;
        if status.partial_threshold > 100 {
            return Err(Error::Config(format!(
                "partial_threshold {} is above 100",
                status.partial_threshold
            )));
        }
        if status.current_window_days < 0 || status.next_window_days < status.current_window_days {
            return Err(Error::Config(format!(
                "status windows must satisfy 0 <= current ({}) <= next ({})",
                status.current_window_days, status.next_window_days
            )));
        }
        if let Some(bad) = self.sports.iter().find(|s| s.id.trim().is_empty()) {
            return Err(Error::Config(format!(
                "sport override with empty id (aerobic = {})",
                bad.aerobic
            )));
        }
        Ok(())
    }
}
