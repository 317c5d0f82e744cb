//! Tuning configuration.
//!
//! Loaded once (usually from a TOML file) and passed by reference to the
//! engine. Missing keys take the documented defaults; invalid values are
//! replaced by their default with a warning instead of failing a tick.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::constants::*;
use crate::enums::TargetingMode;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Process-wide awareness tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AwarenessConfig {
    /// Threat ledger or legacy tactics.
    pub targeting_mode: TargetingMode,
    /// Scales every detection radius.
    pub detection_range_multiplier: f64,
    pub default_visual_range: f64,
    pub default_aural_range: f64,
    pub default_chase_range: f64,
    /// Radius of the "visible objects" spatial query.
    pub visibility_radius: f64,
    pub retarget_interval_secs: f64,
    pub passive_scan_interval_secs: f64,
    pub threat_decay_interval_secs: f64,
    pub alert_cooldown_secs: f64,
    pub bonus_spawn_chance: f64,
    pub return_speed: f64,
}

impl Default for AwarenessConfig {
    fn default() -> Self {
        Self {
            targeting_mode: TargetingMode::Threat,
            detection_range_multiplier: 1.0,
            default_visual_range: DEFAULT_VISUAL_RANGE,
            default_aural_range: DEFAULT_AURAL_RANGE,
            default_chase_range: DEFAULT_CHASE_RANGE,
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            retarget_interval_secs: DEFAULT_RETARGET_INTERVAL_SECS,
            passive_scan_interval_secs: DEFAULT_PASSIVE_SCAN_INTERVAL_SECS,
            threat_decay_interval_secs: DEFAULT_THREAT_DECAY_INTERVAL_SECS,
            alert_cooldown_secs: DEFAULT_ALERT_COOLDOWN_SECS,
            bonus_spawn_chance: DEFAULT_BONUS_SPAWN_CHANCE,
            return_speed: DEFAULT_RETURN_SPEED,
        }
    }
}

impl AwarenessConfig {
    /// Parse a TOML document and sanitize the result.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AwarenessConfig = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path`, falling back to defaults when it is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "using default awareness config");
                Self::default()
            }
        }
    }

    /// Replace non-finite or out-of-range values by their defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        let fields = [
            (&mut self.detection_range_multiplier, d.detection_range_multiplier, "detection_range_multiplier"),
            (&mut self.default_visual_range, d.default_visual_range, "default_visual_range"),
            (&mut self.default_aural_range, d.default_aural_range, "default_aural_range"),
            (&mut self.default_chase_range, d.default_chase_range, "default_chase_range"),
            (&mut self.visibility_radius, d.visibility_radius, "visibility_radius"),
            (&mut self.retarget_interval_secs, d.retarget_interval_secs, "retarget_interval_secs"),
            (&mut self.passive_scan_interval_secs, d.passive_scan_interval_secs, "passive_scan_interval_secs"),
            (&mut self.threat_decay_interval_secs, d.threat_decay_interval_secs, "threat_decay_interval_secs"),
            (&mut self.alert_cooldown_secs, d.alert_cooldown_secs, "alert_cooldown_secs"),
            (&mut self.return_speed, d.return_speed, "return_speed"),
        ];
        for (value, default, name) in fields {
            if !value.is_finite() || *value <= 0.0 {
                warn!(key = name, value = *value, default, "invalid config value, using default");
                *value = default;
            }
        }
        if !(0.0..=1.0).contains(&self.bonus_spawn_chance) {
            warn!(
                value = self.bonus_spawn_chance,
                "bonus_spawn_chance outside [0, 1], using default"
            );
            self.bonus_spawn_chance = d.bonus_spawn_chance;
        }
        self
    }

    /// Squared detection radius for a base range, scaled by level and the
    /// global multiplier.
    pub fn scaled_range_sq(&self, base: Option<f64>, fallback: f64, level: u32) -> f64 {
        let base = match base {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => fallback,
        };
        let level_bonus = (level as f64 * LEVEL_RANGE_BONUS).min(MAX_LEVEL_RANGE_BONUS);
        let range = base * (1.0 + level_bonus) * self.detection_range_multiplier;
        range * range
    }
}
