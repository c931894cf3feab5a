/// Application configuration management
/// Stores monitor preferences in ~/.config/dockmon/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::utils::constants::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between automatic refresh cycles (2-60)
    pub refresh_secs: u64,
    /// Samples kept per container for sparklines (10-100)
    pub history_window: usize,
    /// Whether the dashboard refreshes on its own timer
    pub auto_refresh: bool,
    /// Concurrent stats fetches per cycle (1-64)
    pub max_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_secs: DEFAULT_REFRESH_SECS,
            history_window: DEFAULT_HISTORY_WINDOW,
            auto_refresh: true,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl AppConfig {
    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dockmon");

        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    /// Out-of-range values are clamped rather than rejected.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .context("Failed to read config file")?;

        let config: Self = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config.clamped())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Bring every field back into its documented range
    pub fn clamped(mut self) -> Self {
        self.refresh_secs = self.refresh_secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        self.history_window = self
            .history_window
            .clamp(MIN_HISTORY_WINDOW, MAX_HISTORY_WINDOW);
        self.max_workers = self.max_workers.clamp(1, MAX_WORKERS_LIMIT);
        self
    }
}
