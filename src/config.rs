//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.quizkeeper.toml` files.

use crate::models::{ScoreRange, StudentId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".quizkeeper.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data file settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Accepted score range.
    #[serde(default)]
    pub scores: ScoresConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Save after every change made from the interactive menu.
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { autosave: true }
    }
}

fn default_true() -> bool {
    true
}

/// Data file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON data file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// First identifier handed out in a fresh dataset.
    #[serde(default = "default_id_start")]
    pub id_start: StudentId,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            id_start: default_id_start(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("quiz_data.json")
}

fn default_id_start() -> StudentId {
    101
}

/// Score bounds, inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresConfig {
    #[serde(default = "default_min_score")]
    pub min: u32,

    #[serde(default = "default_max_score")]
    pub max: u32,
}

impl Default for ScoresConfig {
    fn default() -> Self {
        Self {
            min: default_min_score(),
            max: default_max_score(),
        }
    }
}

fn default_min_score() -> u32 {
    0
}

fn default_max_score() -> u32 {
    10
}

impl ScoresConfig {
    pub fn range(&self) -> ScoreRange {
        ScoreRange {
            min: self.min,
            max: self.max,
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of entries shown on the leaderboard.
    #[serde(default = "default_top_n")]
    pub leaderboard_top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            leaderboard_top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.scores.min > self.scores.max {
            bail!(
                "Invalid score range: min ({}) is greater than max ({})",
                self.scores.min,
                self.scores.max
            );
        }
        if self.report.leaderboard_top_n == 0 {
            bail!("leaderboard_top_n must be at least 1");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.storage.data_file = data.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
