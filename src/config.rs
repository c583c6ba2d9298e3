//! Configuration system for modal
//!
//! Loads configuration from TOML file at `~/.config/modal/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ModalError;
use crate::grab::RetryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lock file, relative to the home directory
    pub lock_file: String,
    /// Event trace file, relative to the home directory (stderr only if unset)
    pub log_file: Option<String>,
    /// Environment variable carrying the host window id to the child
    pub embed_env: String,
    pub grab: GrabConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_file: ".modallock".to_string(),
            log_file: None,
            embed_env: "XEMBED".to_string(),
            grab: GrabConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path; a missing file is created with defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config = Self::parse(&content)?;

        debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Absolute path of the single-instance lock file
    pub fn lock_path(&self) -> std::result::Result<PathBuf, ModalError> {
        Ok(home_dir()?.join(&self.lock_file))
    }

    /// Absolute path of the event trace file, if one is configured
    pub fn log_path(&self) -> std::result::Result<Option<PathBuf>, ModalError> {
        match self.log_file.as_deref() {
            None | Some("") => Ok(None),
            Some(file) => Ok(Some(home_dir()?.join(file))),
        }
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("modal");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

fn home_dir() -> std::result::Result<PathBuf, ModalError> {
    dirs::home_dir().ok_or(ModalError::NoHome)
}

/// Retry ceilings for focus and keyboard acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    pub focus_attempts: u32,
    pub focus_delay_ms: u64,
    pub keyboard_attempts: u32,
    pub keyboard_delay_ms: u64,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            focus_attempts: 100,
            focus_delay_ms: 10,
            keyboard_attempts: 1000,
            keyboard_delay_ms: 1,
        }
    }
}

impl GrabConfig {
    pub fn focus_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.focus_attempts, Duration::from_millis(self.focus_delay_ms))
    }

    pub fn keyboard_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.keyboard_attempts,
            Duration::from_millis(self.keyboard_delay_ms),
        )
    }
}
