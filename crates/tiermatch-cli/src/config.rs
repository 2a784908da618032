//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tiermatch_domain::{LockedIdea, LockedIdeas, TierBoundaries, DEFAULT_TIER1_MIN, DEFAULT_TIER2_MIN};
use tiermatch_sheet::{client, cohort};

/// Name of the per-user data directory under the home directory
const APP_DIR: &str = ".tiermatch";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared sheet location
    #[serde(default)]
    pub sheet: SheetSettings,

    /// Local state database
    #[serde(default)]
    pub storage: StorageSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Initial tier thresholds
    #[serde(default)]
    pub defaults: Defaults,

    /// Ideas whose founder is already decided
    #[serde(default = "default_locked_ideas")]
    pub locked_ideas: Vec<LockedIdeaConfig>,
}

/// Where and how to fetch the shared sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSettings {
    /// CSV export URL; empty means offline
    #[serde(default = "default_sheet_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Local storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database path; defaults to `~/.tiermatch/state.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Command history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Quiet period before edits are written to disk
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

/// Thresholds used when a user has no saved boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Lowest rating in tier 1
    #[serde(default = "default_tier1_min")]
    pub tier1_min: u8,

    /// Lowest rating in tier 2
    #[serde(default = "default_tier2_min")]
    pub tier2_min: u8,
}

/// One `[[locked_ideas]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedIdeaConfig {
    /// Idea name as it appears in the sheet
    pub idea: String,
    /// Participant founding the idea
    pub owner: String,
    /// Explanation shown with the match
    #[serde(default)]
    pub note: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding config, state and history.
    pub fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(APP_DIR))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Load configuration from a file, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the configuration, writing the defaults out on first use.
    pub fn load_or_create(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };
        if path.exists() {
            return Self::load_from(&path);
        }
        let config = Self::default();
        config.save_to(&path)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Resolved database path.
    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::app_dir()?.join("state.db")),
        }
    }

    /// REPL history file.
    pub fn history_path(&self) -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("history.txt"))
    }

    /// Validated default thresholds.
    pub fn default_bounds(&self) -> Result<TierBoundaries> {
        TierBoundaries::new(self.defaults.tier1_min, self.defaults.tier2_min)
            .map_err(|e| CliError::Config(format!("[defaults]: {}", e)))
    }

    /// Locked-idea table.
    pub fn locked(&self) -> LockedIdeas {
        LockedIdeas::new(
            self.locked_ideas
                .iter()
                .map(|entry| LockedIdea {
                    idea: entry.idea.clone(),
                    owner: entry.owner.clone(),
                    note: entry.note.clone(),
                })
                .collect(),
        )
    }

    /// True when no sheet URL is configured.
    pub fn is_offline(&self) -> bool {
        self.sheet.url.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet: SheetSettings::default(),
            storage: StorageSettings::default(),
            settings: Settings::default(),
            defaults: Defaults::default(),
            locked_ideas: default_locked_ideas(),
        }
    }
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            url: default_sheet_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: 1000,
            save_debounce_ms: default_save_debounce_ms(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            tier1_min: DEFAULT_TIER1_MIN,
            tier2_min: DEFAULT_TIER2_MIN,
        }
    }
}

fn default_sheet_url() -> String {
    cohort::SHEET_CSV_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    client::DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    client::DEFAULT_MAX_RETRIES
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}

fn default_save_debounce_ms() -> u64 {
    500
}

fn default_tier1_min() -> u8 {
    DEFAULT_TIER1_MIN
}

fn default_tier2_min() -> u8 {
    DEFAULT_TIER2_MIN
}

fn default_locked_ideas() -> Vec<LockedIdeaConfig> {
    cohort::default_locked_ideas()
        .into_iter()
        .map(|lock| LockedIdeaConfig {
            idea: lock.idea,
            owner: lock.owner,
            note: lock.note,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.save_debounce_ms, 500);
        assert_eq!(config.default_bounds().unwrap(), TierBoundaries::default());
        assert!(!config.is_offline());
    }

    #[test]
    fn test_default_locks_builtin_owner() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.locked_ideas.len(), 1);
        assert_eq!(config.locked().get("Safe Start").map(|l| l.owner.as_str()), Some("Elisa"));
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [sheet]
            url = ""

            [defaults]
            tier1_min = 5

            [[locked_ideas]]
            idea = "WASH"
            owner = "Anju"
            "#,
        )
        .unwrap();

        assert!(config.is_offline());
        assert_eq!(config.sheet.timeout_secs, 15);
        assert_eq!(config.default_bounds().unwrap().tier1_min(), 5);
        assert_eq!(config.locked_ideas.len(), 1);
        assert!(config.locked().get("Safe Start").is_none());
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        let mut config = Config::default();
        config.defaults.tier2_min = 6;
        assert!(matches!(config.default_bounds(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(Some(&path)).unwrap();
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.sheet.url, created.sheet.url);
        assert_eq!(reloaded.locked_ideas, created.locked_ideas);
    }
}
