//! Configuration sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::logging::LoggingConfig;
use crate::error::{PilotError, PilotResult};
use crate::suggester::SuggestionPreferences;

/// Longest focus session that can be requested, in minutes
pub const FOCUS_MAX_DURATION_MINUTES: u32 = 240;
/// Longest single focus extension, in minutes
pub const FOCUS_MAX_EXTENSION_MINUTES: u32 = 120;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Mode switching gate
    pub switching: SwitchingConfig,
    /// Focus lock limits
    pub focus: FocusConfig,
    /// Transition snapshot cache
    pub snapshots: SnapshotConfig,
    /// Suggestion preferences
    pub suggestions: SuggestionPreferences,
    /// Logging
    pub logging: LoggingConfig,
}

impl PilotConfig {
    /// Validate every section
    pub fn validate(&self) -> PilotResult<()> {
        self.switching.validate()?;
        self.focus.validate()?;
        self.snapshots.validate()?;
        if !(0.0..=1.0).contains(&self.suggestions.min_confidence) {
            return Err(PilotError::invalid_input_field(
                "min_confidence must be between 0 and 1",
                "suggestions.min_confidence",
            ));
        }
        Ok(())
    }
}

/// Mode switching gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchingConfig {
    /// Whether automatic switching starts enabled
    pub auto_switch_enabled: bool,
    /// Minimum dwell time in a mode before any automatic switch
    #[serde(with = "humantime_serde")]
    pub hysteresis: Duration,
    /// Minimum time between consecutive switches
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    /// Confidence required for pairs without a specific threshold
    pub default_threshold: f64,
    /// Maximum transitions kept in history
    pub history_limit: usize,
}

impl Default for SwitchingConfig {
    fn default() -> Self {
        Self {
            auto_switch_enabled: true,
            hysteresis: Duration::from_secs(30),
            cooldown: Duration::from_secs(10),
            default_threshold: 0.70,
            history_limit: 100,
        }
    }
}

impl SwitchingConfig {
    fn validate(&self) -> PilotResult<()> {
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(PilotError::invalid_input_field(
                "default_threshold must be between 0 and 1",
                "switching.default_threshold",
            ));
        }
        if self.history_limit == 0 {
            return Err(PilotError::invalid_input_field(
                "history_limit must be at least 1",
                "switching.history_limit",
            ));
        }
        Ok(())
    }
}

/// Focus lock configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Longest session that may be requested
    pub max_duration_minutes: u32,
    /// Longest single extension
    pub max_extension_minutes: u32,
    /// Countdown tick interval
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            max_duration_minutes: FOCUS_MAX_DURATION_MINUTES,
            max_extension_minutes: FOCUS_MAX_EXTENSION_MINUTES,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl FocusConfig {
    fn validate(&self) -> PilotResult<()> {
        if !(1..=FOCUS_MAX_DURATION_MINUTES).contains(&self.max_duration_minutes) {
            return Err(PilotError::invalid_input_field(
                format!("max_duration_minutes must be between 1 and {}", FOCUS_MAX_DURATION_MINUTES),
                "focus.max_duration_minutes",
            ));
        }
        if !(1..=FOCUS_MAX_EXTENSION_MINUTES).contains(&self.max_extension_minutes) {
            return Err(PilotError::invalid_input_field(
                format!("max_extension_minutes must be between 1 and {}", FOCUS_MAX_EXTENSION_MINUTES),
                "focus.max_extension_minutes",
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(PilotError::invalid_input_field(
                "tick_interval must be positive",
                "focus.tick_interval",
            ));
        }
        Ok(())
    }
}

/// Transition snapshot cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Maximum cached snapshots
    pub max_cache_size: usize,
    /// Age after which `prune_snapshots` drops an entry
    #[serde(with = "humantime_serde")]
    pub prune_after: Duration,
    /// Mirror snapshots captured on switch to disk
    pub persist: bool,
    /// Root of per-session snapshot directories
    pub storage_dir: Option<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 10,
            prune_after: Duration::from_secs(60 * 60),
            persist: false,
            storage_dir: None,
        }
    }
}

impl SnapshotConfig {
    /// Storage directory, falling back to the user config directory
    pub fn resolved_storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("~/.config"))
                .join("pilot")
                .join("sessions")
        })
    }

    fn validate(&self) -> PilotResult<()> {
        if self.max_cache_size == 0 {
            return Err(PilotError::invalid_input_field(
                "max_cache_size must be at least 1",
                "snapshots.max_cache_size",
            ));
        }
        Ok(())
    }
}
