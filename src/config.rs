//! Configuration handling
//!
//! Configuration is stored as TOML, either at an explicit path or in the
//! user's global config directory (`~/.config/timeline/config.toml` on
//! Linux). Every section and field is optional.
//!
//! ```toml
//! [timeline]
//! export_order = "descending"
//! ending_match = "date_only"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Timeline, TimelineOptions};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Options applied to timelines built from this configuration
    pub timeline: TimelineOptions,
}

impl Config {
    /// Parses configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads configuration from a file, falling back to defaults if it
    /// does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!(
                "event=config_load module=config status=default path={}",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        log::debug!(
            "event=config_load module=config status=ok path={}",
            path.display()
        );
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "timeline", "timeline").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads the global configuration, or defaults if there is none
    pub fn load_global() -> Result<Self> {
        match Self::global_config_dir() {
            Some(dir) => Self::load(&dir.join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Writes the configuration, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Creates an empty timeline using these options
    pub fn timeline(&self) -> Timeline {
        Timeline::new().with_options(self.timeline)
    }
}
