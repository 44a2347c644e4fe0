// ABOUTME: Configuration loading and management for chirp
// ABOUTME: TOML config file with engine timing policy, storage, replies, and appearance

use crate::grouping::TimestampPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timing and failure policy of the chat engine
    pub engine: EngineConfig,
    /// Where conversation state lives
    pub storage: StorageConfig,
    /// Reply corpus settings
    pub replies: RepliesConfig,
    /// Front-end appearance
    pub appearance: AppearanceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lower bound of the simulated thinking delay after a send
    pub send_delay_min_ms: u64,
    /// Upper bound (exclusive) of the send delay
    pub send_delay_max_ms: u64,
    /// Lower bound of the delay before a retried reply starts
    pub retry_delay_min_ms: u64,
    /// Upper bound (exclusive) of the retry delay
    pub retry_delay_max_ms: u64,
    /// Probability that a send produces a failed bot message
    pub failure_probability: f64,
    /// Period of the character reveal tick
    pub tick_ms: u64,
    /// Quiet period before the conversation is written to storage
    pub save_debounce_ms: u64,
    /// Which message of a same-role run shows its timestamp
    pub timestamp_policy: TimestampPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            send_delay_min_ms: 400,
            send_delay_max_ms: 1100,
            retry_delay_min_ms: 300,
            retry_delay_max_ms: 700,
            failure_probability: 0.10,
            tick_ms: 25,
            save_debounce_ms: 1000,
            timestamp_policy: TimestampPolicy::LastInGroup,
        }
    }
}

/// Ceiling for every engine timer: one hour
pub const MAX_TIMER_MS: u64 = 60 * 60 * 1000;

impl EngineConfig {
    /// Clamp values into ranges the engine can run with
    pub fn validated(mut self) -> Self {
        self.failure_probability = if self.failure_probability.is_nan() {
            0.0
        } else {
            self.failure_probability.clamp(0.0, 1.0)
        };
        self.tick_ms = self.tick_ms.clamp(1, MAX_TIMER_MS);
        self.save_debounce_ms = self.save_debounce_ms.min(MAX_TIMER_MS);
        self.send_delay_min_ms = self.send_delay_min_ms.min(MAX_TIMER_MS);
        self.send_delay_max_ms = self.send_delay_max_ms.min(MAX_TIMER_MS);
        self.retry_delay_min_ms = self.retry_delay_min_ms.min(MAX_TIMER_MS);
        self.retry_delay_max_ms = self.retry_delay_max_ms.min(MAX_TIMER_MS);
        self.send_delay_max_ms = self.send_delay_max_ms.max(self.send_delay_min_ms);
        self.retry_delay_max_ms = self.retry_delay_max_ms.max(self.retry_delay_min_ms);
        self
    }

    pub fn send_delay(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.send_delay_min_ms),
            Duration::from_millis(self.send_delay_max_ms),
        )
    }

    pub fn retry_delay(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.retry_delay_min_ms),
            Duration::from_millis(self.retry_delay_max_ms),
        )
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding stored keys (defaults to the XDG data dir)
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepliesConfig {
    /// JSON corpus replacing the built-in replies
    pub corpus_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Theme name; when unset the stored preference is used
    pub theme: Option<String>,
}

impl Config {
    /// Get the XDG config directory for chirp (~/.config/chirp)
    pub fn config_dir() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|p| p.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("chirp")
    }

    /// Get the XDG data directory for chirp (~/.local/share/chirp)
    pub fn data_dir() -> PathBuf {
        std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|p| p.join(".local").join("share"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("chirp")
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load config from the XDG config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.engine = config.engine.validated();

        Ok(config)
    }

    /// Apply CHIRP_THEME and CHIRP_DATA_DIR from the environment
    pub fn apply_env(&mut self) {
        let theme = std::env::var("CHIRP_THEME").ok();
        let data_dir = std::env::var("CHIRP_DATA_DIR").ok().map(PathBuf::from);
        self.apply_overrides(theme.as_deref(), data_dir.as_deref());
    }

    /// Apply explicit overrides; `None` leaves the current value alone
    pub fn apply_overrides(&mut self, theme: Option<&str>, data_dir: Option<&Path>) {
        if let Some(theme) = theme.filter(|t| !t.trim().is_empty()) {
            self.appearance.theme = Some(theme.trim().to_string());
        }
        if let Some(dir) = data_dir {
            self.storage.data_dir = Some(dir.to_path_buf());
        }
    }

    /// Directory the file store writes into
    pub fn data_path(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::data_dir)
    }

    /// Generate a default config file content
    pub fn default_toml() -> String {
        r#"# chirp configuration
# Location: ~/.config/chirp/config.toml

[engine]
send_delay_min_ms = 400
send_delay_max_ms = 1100
retry_delay_min_ms = 300
retry_delay_max_ms = 700
failure_probability = 0.1
tick_ms = 25
save_debounce_ms = 1000
# "last_in_group" or "first_in_group"
timestamp_policy = "last_in_group"

[storage]
# data_dir = "~/.local/share/chirp"

[replies]
# corpus_path = "~/.config/chirp/replies.json"

[appearance]
# theme = "dark"
"#
        .to_string()
    }

    /// Initialize config directory and create default config if needed
    pub fn init() -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_path();

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_toml())
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Ok(config_path)
    }
}
