/// Configuration system for hunk-miner
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, MinerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Tree diff configuration
    #[serde(default)]
    pub diff: DiffConfig,

    /// Commit history configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// Tree diff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Unchanged lines shown around each change
    #[serde(default = "default_context_lines")]
    pub context_lines: u32,

    /// Pair deleted and added paths with similar content into renames
    #[serde(default = "default_detect_renames")]
    pub detect_renames: bool,

    /// Report added paths copied from a modified path as copies.
    /// Ignored unless `detect_renames` is set.
    #[serde(default = "default_detect_copies")]
    pub detect_copies: bool,

    /// Similarity percentage at which a delete/add pair becomes a rename
    #[serde(default = "default_rename_threshold")]
    pub rename_threshold: u16,
}

/// Commit history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Follow only the first parent of merge commits
    #[serde(default = "default_first_parent")]
    pub first_parent: bool,
}

fn default_context_lines() -> u32 {
    3
}

fn default_detect_renames() -> bool {
    true
}

fn default_detect_copies() -> bool {
    true
}

fn default_rename_threshold() -> u16 {
    50 // libgit2 default
}

fn default_first_parent() -> bool {
    true
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            detect_renames: default_detect_renames(),
            detect_copies: default_detect_copies(),
            rename_threshold: default_rename_threshold(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            first_parent: default_first_parent(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, MinerError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, MinerError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), MinerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.diff.rename_threshold > 100 {
            return Err(ConfigError::InvalidValue {
                key: "diff.rename_threshold".to_string(),
                reason: format!(
                    "must be between 0 and 100, got {}",
                    self.diff.rename_threshold
                ),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(lines) = std::env::var("HUNK_MINER_CONTEXT_LINES")
            && let Ok(lines) = lines.parse()
        {
            self.diff.context_lines = lines;
        }

        if let Ok(flag) = std::env::var("HUNK_MINER_DETECT_RENAMES")
            && let Some(flag) = parse_flag(&flag)
        {
            self.diff.detect_renames = flag;
        }

        if let Ok(flag) = std::env::var("HUNK_MINER_DETECT_COPIES")
            && let Some(flag) = parse_flag(&flag)
        {
            self.diff.detect_copies = flag;
        }

        if let Ok(threshold) = std::env::var("HUNK_MINER_RENAME_THRESHOLD")
            && let Ok(threshold) = threshold.parse()
        {
            self.diff.rename_threshold = threshold;
        }

        if let Ok(flag) = std::env::var("HUNK_MINER_FIRST_PARENT")
            && let Some(flag) = parse_flag(&flag)
        {
            self.log.first_parent = flag;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, MinerError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
