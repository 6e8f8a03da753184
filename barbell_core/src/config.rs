//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/barbell/config.toml`.

use crate::types::DEFAULT_REP_TARGET;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub program: ProgramConfig,
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

/// Progression parameters configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Reps each set must reach for the session to count as a success
    #[serde(default = "default_rep_target")]
    pub rep_target: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            rep_target: default_rep_target(),
        }
    }
}

/// Program configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Working weight for a lift that has never been logged
    #[serde(default = "default_starting_weight")]
    pub starting_weight: f64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            starting_weight: default_starting_weight(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("barbell")
}

fn default_rep_target() -> u32 {
    DEFAULT_REP_TARGET
}

fn default_starting_weight() -> f64 {
    20.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("barbell")
            .join("config.toml")
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.progression.rep_target == 0 {
            return Err(Error::Config("progression.rep_target must be at least 1".into()));
        }
        if !self.program.starting_weight.is_finite() || self.program.starting_weight < 0.0 {
            return Err(Error::Config(format!(
                "program.starting_weight must be a non-negative number, got {}",
                self.program.starting_weight
            )));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
