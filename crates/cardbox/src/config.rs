//! # Configuration
//!
//! cardbox configuration is loaded with [`confique`] from layered sources.
//!
//! ## Resolution Order
//!
//! Highest priority first:
//! 1. **Environment variables**: `CARDBOX_LOG`, `CARDBOX_FIXED_EXPIRATION_HOUR`.
//! 2. **Explicit file**: a `cardbox.toml` path handed to [`CardboxConfig::load`].
//! 3. **User config**: `cardbox.toml` in the OS config directory (via the
//!    `directories` crate).
//! 4. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `log_filter` | `info` | `tracing` filter directive for [`crate::logging::init_tracing`] |
//! | `interval_days` | none | Days a card stays learned per level, e.g. `[1, 3, 7, 14]` |
//! | `fixed_expiration_hour` | none | Snap due times to this UTC hour |
//!
//! There is deliberately no default for `interval_days`: the review intervals
//! are the user's choice, and [`CardboxConfig::schedule`] fails until they are
//! configured.

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CardboxError, Result};
use crate::schedule::ConfiguredSchedule;

const CONFIG_FILENAME: &str = "cardbox.toml";

/// Configuration for cardbox, stored in `cardbox.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CardboxConfig {
    /// Filter directive for log output (e.g. "info", "cardbox=debug").
    #[config(env = "CARDBOX_LOG", default = "info")]
    pub log_filter: String,

    /// Days a card stays learned after reaching each level, starting at level 1.
    pub interval_days: Option<Vec<u32>>,

    /// When set, due times snap to this hour of the day (UTC, 0-23).
    #[config(env = "CARDBOX_FIXED_EXPIRATION_HOUR")]
    pub fixed_expiration_hour: Option<u32>,
}

impl Default for CardboxConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            interval_days: None,
            fixed_expiration_hour: None,
        }
    }
}

impl CardboxConfig {
    /// Loads env, then `explicit` (if given), then the user config file.
    /// Missing files are skipped.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut files: Vec<PathBuf> = explicit.map(Path::to_path_buf).into_iter().collect();
        files.extend(default_config_path());
        Self::load_from(&files)
    }

    /// Loads env, then each file in order of decreasing priority.
    pub fn load_from(files: &[PathBuf]) -> Result<Self> {
        let mut builder = Self::builder().env();
        for file in files {
            builder = builder.file(file);
        }
        let config = builder.load()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Builds the expiration policy described by this configuration.
    pub fn schedule(&self) -> Result<ConfiguredSchedule> {
        let days = self.interval_days.clone().ok_or_else(|| {
            CardboxError::Schedule("no interval_days configured".to_string())
        })?;
        ConfiguredSchedule::new(days, self.fixed_expiration_hour)
    }
}

/// `cardbox.toml` in the OS-appropriate config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cardbox").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
