//! # Config Loader — Loads and validates TOML configuration
//!
//! Reads `fanzdash.toml` (or a custom path) and deserializes into typed
//! config structs. A missing file is not an error: defaults apply and a
//! warning is logged, so a bare deployment still comes up.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Top-level FanzDash core configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanzConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub compliance: ComplianceConfig,
    #[serde(default)]
    pub crisis: CrisisConfig,
    /// On-call rosters surfaced on the command center.
    #[serde(default)]
    pub rosters: Vec<RosterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Override path for the violation rule taxonomy (TOML). Empty means
    /// the embedded builtin table.
    #[serde(default)]
    pub rules_path: String,
    /// Compliance event log capacity (FIFO eviction beyond this).
    pub event_log_capacity: usize,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self { rules_path: String::new(), event_log_capacity: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisConfig {
    /// Override path for the response plan catalog (TOML). Empty means
    /// the embedded builtin catalog.
    #[serde(default)]
    pub plans_path: String,
    /// Compliance backlog size past which the command center flags the
    /// moderation queue as backing up.
    pub backlog_alert_threshold: u64,
}

impl Default for CrisisConfig {
    fn default() -> Self {
        Self { plans_path: String::new(), backlog_alert_threshold: 100 }
    }
}

/// One on-call roster entry (team plus primary/secondary responders).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub team: String,
    pub primary: String,
    #[serde(default)]
    pub secondary: String,
    #[serde(default)]
    pub contact: String,
}

impl FanzConfig {
    /// Load config from a TOML file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;
        let config: FanzConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        info!(
            path = %path.display(),
            event_log_capacity = config.compliance.event_log_capacity,
            rosters = config.rosters.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Save current config to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;
        Ok(())
    }
}
