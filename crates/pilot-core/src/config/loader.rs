//! Configuration loader
//!
//! Loads settings from user and project JSON files, deep-merges them over the
//! defaults, applies `PILOT_*` environment overrides and validates the result.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::PilotConfig;
use crate::error::{PilotError, PilotResult};

/// File name used at both user and project level
const CONFIG_FILE: &str = "modes.json";

/// Where configuration files are looked up
#[derive(Debug, Clone, Default)]
pub struct ConfigLocations {
    /// User-level file (`~/.config/pilot/modes.json`)
    pub user: Option<PathBuf>,
    /// Project-level file (`<root>/.pilot/modes.json`)
    pub project: Option<PathBuf>,
}

impl ConfigLocations {
    /// Discover locations from the current working directory
    pub fn discover() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::discover_from(cwd)
    }

    /// Discover locations for a specific project root
    pub fn discover_from(project_root: impl AsRef<Path>) -> Self {
        Self {
            user: dirs::config_dir().map(|d| d.join("pilot").join(CONFIG_FILE)),
            project: Some(project_root.as_ref().join(".pilot").join(CONFIG_FILE)),
        }
    }
}

/// Loader that merges configuration from every source
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    locations: ConfigLocations,
    /// Whether `PILOT_*` environment variables are applied
    use_env: bool,
}

impl ConfigLoader {
    /// Create a loader using discovered locations
    pub fn new() -> Self {
        Self::with_locations(ConfigLocations::discover())
    }

    /// Create a loader from specific locations
    pub fn with_locations(locations: ConfigLocations) -> Self {
        Self {
            locations,
            use_env: true,
        }
    }

    /// Ignore environment overrides
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Get the configured locations
    pub fn locations(&self) -> &ConfigLocations {
        &self.locations
    }

    /// Load, merge, override and validate
    pub fn load(&self) -> PilotResult<PilotConfig> {
        let mut merged = serde_json::to_value(PilotConfig::default())?;

        for path in [&self.locations.user, &self.locations.project]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                continue;
            }
            match Self::read_value(path) {
                Ok(value) => {
                    tracing::debug!("Loaded mode settings from {:?}", path);
                    merge_values(&mut merged, value);
                }
                Err(e) => {
                    tracing::warn!("Failed to load mode settings from {:?}: {}", path, e);
                }
            }
        }

        let mut config: PilotConfig = serde_json::from_value(merged)
            .map_err(|e| PilotError::config(format!("Invalid mode settings: {}", e)))?;

        if self.use_env {
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a single settings file into a config (no merging)
    pub fn load_from_file(path: impl AsRef<Path>) -> PilotResult<PilotConfig> {
        let path = path.as_ref();
        let value = Self::read_value(path)?;
        let mut merged = serde_json::to_value(PilotConfig::default())?;
        merge_values(&mut merged, value);
        let config: PilotConfig = serde_json::from_value(merged).map_err(|e| {
            PilotError::config(format!("Failed to parse settings file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save a config as pretty JSON
    pub fn save_to_file(config: &PilotConfig, path: impl AsRef<Path>) -> PilotResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PilotError::config(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| PilotError::config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            PilotError::config(format!("Failed to write settings file {:?}: {}", path, e))
        })?;

        Ok(())
    }

    fn read_value(path: &Path) -> PilotResult<Value> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PilotError::config(format!("Failed to read settings file {:?}: {}", path, e))
        })?;
        serde_json::from_str(&strip_json_comments(&content)).map_err(|e| {
            PilotError::config(format!("Failed to parse settings file {:?}: {}", path, e))
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`; objects merge, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `PILOT_*` overrides; unparsable values are logged and ignored
fn apply_env_overrides(config: &mut PilotConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PILOT_AUTO_SWITCH") {
        match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.switching.auto_switch_enabled = true,
            "0" | "false" | "no" | "off" => config.switching.auto_switch_enabled = false,
            _ => tracing::warn!("Ignoring invalid PILOT_AUTO_SWITCH value: {}", v),
        }
    }

    if let Some(v) = var("PILOT_HYSTERESIS") {
        match parse_duration(&v) {
            Ok(d) => config.switching.hysteresis = d,
            Err(e) => tracing::warn!("Ignoring invalid PILOT_HYSTERESIS value {}: {}", v, e),
        }
    }

    if let Some(v) = var("PILOT_COOLDOWN") {
        match parse_duration(&v) {
            Ok(d) => config.switching.cooldown = d,
            Err(e) => tracing::warn!("Ignoring invalid PILOT_COOLDOWN value {}: {}", v, e),
        }
    }

    if let Some(v) = var("PILOT_SNAPSHOT_CACHE_SIZE") {
        match v.parse::<usize>() {
            Ok(n) => config.snapshots.max_cache_size = n,
            Err(e) => tracing::warn!("Ignoring invalid PILOT_SNAPSHOT_CACHE_SIZE value {}: {}", v, e),
        }
    }

    if let Some(v) = var("PILOT_LOG_LEVEL") {
        config.logging.level = v;
    }
}

/// Parse a human-readable duration ("30s", "2m") through the serde adapter
fn parse_duration(value: &str) -> Result<Duration, serde_json::Error> {
    #[derive(serde::Deserialize)]
    struct Wrapped(#[serde(with = "humantime_serde")] Duration);

    serde_json::from_value::<Wrapped>(Value::String(value.to_string())).map(|w| w.0)
}

/// Strip JSON comments (// and /* */)
fn strip_json_comments(content: &str) -> String {
    let mut result = String::new();
    let mut chars = content.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if !in_string && c == '/' {
            match chars.peek() {
                Some('/') => {
                    while let Some(&ch) = chars.peek() {
                        if ch == '\n' {
                            break;
                        }
                        chars.next();
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    while let Some(ch) = chars.next() {
                        if ch == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }

        result.push(c);
    }

    result
}
