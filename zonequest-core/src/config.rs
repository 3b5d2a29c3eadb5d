//! Configuration for ZoneQuest.
//!
//! Maps directly to `zonequest.toml`.  Every field has a serde default, so an
//! empty file yields [`GameConfig::default`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ZoneError};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(Default)]
pub struct GameConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Capture mini-game tuning.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Lobby storage settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl GameConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ZoneError::Config` if the TOML is invalid or fails
    /// [`GameConfig::validate`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ZoneError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    /// Returns `ZoneError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let level = self.general.log_level.as_str();
        if !LOG_LEVELS.contains(&level) {
            return Err(ZoneError::Config(format!(
                "general.log_level must be one of {}, got {level:?}",
                LOG_LEVELS.join(", ")
            )));
        }
        let chance = self.capture.success_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ZoneError::Config(format!(
                "capture.success_chance must be within [0, 1], got {chance}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Levels accepted by [`GeneralConfig::log_level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl GeneralConfig {
    /// `tracing_subscriber::EnvFilter` directive scoping `log_level` to this
    /// crate, e.g. `zonequest_core=info`.
    #[must_use]
    pub fn log_directive(&self) -> String {
        format!("{}={}", env!("CARGO_CRATE_NAME"), self.log_level)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Capture mini-game tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// How long a search runs before a creature shows up.
    #[serde(default = "default_2500")]
    pub search_delay_ms: u64,
    /// Probability that a catch attempt succeeds.
    #[serde(default = "default_0_5")]
    pub success_chance: f64,
    /// Fixed RNG seed for reproducible sessions; entropy when unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl CaptureConfig {
    /// Search delay as a [`Duration`].
    #[must_use]
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: 2500,
            success_chance: 0.5,
            rng_seed: None,
        }
    }
}

/// Which key-value backend stores lobbies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite file at [`PersistenceConfig::path`].
    Sqlite,
    /// Process-local map; nothing survives a restart.
    Memory,
}

/// Lobby storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Storage backend.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Database file for the SQLite backend.
    #[serde(default = "default_path")]
    pub path: String,
    /// Enable SQLite WAL journaling.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: "zonequest.db".to_string(),
            wal_mode: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_path() -> String { "zonequest.db".to_string() }
fn default_backend() -> StorageBackend { StorageBackend::Sqlite }
fn default_0_5() -> f64 { 0.5 }
fn default_2500() -> u64 { 2500 }
