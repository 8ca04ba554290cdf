//! Interaction tuning parsed from defaults, environment variables, or JSON.

use std::time::Duration;

use serde::Deserialize;

use crate::consts::{
    CLOSE_DISTANCE, CONNECTION_DISTANCE_THRESHOLD, HOLD_HYSTERESIS, MAX_PAN_SPEED, MIN_PAN_SPEED_FACTOR,
    PAN_AREA_WIDTH, PAN_INTERVAL_MS, PAN_SPEED, RESPONSE_DISTANCE, THICK_EDGE_WIDTH, THIN_EDGE_WIDTH,
    TOGETHER_DISTANCE, WITHDRAW_RATE,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every tunable threshold used by the controllers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractConfig {
    pub pan_area_width: f64,
    pub pan_speed: f64,
    pub min_pan_speed_factor: f64,
    pub max_pan_speed: f64,
    pub pan_interval_ms: u64,
    pub connection_distance_threshold: f64,
    pub response_distance: f64,
    pub close_distance: f64,
    pub together_distance: f64,
    pub withdraw_rate: f64,
    pub hold_hysteresis: f64,
    pub thin_edge_width: f64,
    pub thick_edge_width: f64,
    /// Grid used to snap the reference element while dragging; `None` disables snapping.
    pub snap_grid: Option<f64>,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            pan_area_width: PAN_AREA_WIDTH,
            pan_speed: PAN_SPEED,
            min_pan_speed_factor: MIN_PAN_SPEED_FACTOR,
            max_pan_speed: MAX_PAN_SPEED,
            pan_interval_ms: PAN_INTERVAL_MS,
            connection_distance_threshold: CONNECTION_DISTANCE_THRESHOLD,
            response_distance: RESPONSE_DISTANCE,
            close_distance: CLOSE_DISTANCE,
            together_distance: TOGETHER_DISTANCE,
            withdraw_rate: WITHDRAW_RATE,
            hold_hysteresis: HOLD_HYSTERESIS,
            thin_edge_width: THIN_EDGE_WIDTH,
            thick_edge_width: THICK_EDGE_WIDTH,
            snap_grid: None,
        }
    }
}

impl InteractConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Recognized (all optional):
    /// - `INTERACT_PAN_AREA_WIDTH`, `INTERACT_PAN_SPEED`, `INTERACT_MIN_PAN_SPEED_FACTOR`,
    ///   `INTERACT_MAX_PAN_SPEED`, `INTERACT_PAN_INTERVAL_MS`
    /// - `INTERACT_CONNECTION_DISTANCE_THRESHOLD`
    /// - `INTERACT_RESPONSE_DISTANCE`, `INTERACT_CLOSE_DISTANCE`, `INTERACT_TOGETHER_DISTANCE`,
    ///   `INTERACT_WITHDRAW_RATE`, `INTERACT_HOLD_HYSTERESIS`
    /// - `INTERACT_THIN_EDGE_WIDTH`, `INTERACT_THICK_EDGE_WIDTH`
    /// - `INTERACT_SNAP_GRID`: enables grid snapping when set to a number
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the resulting values fail [`Self::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let cfg = Self {
            pan_area_width: env_parse("INTERACT_PAN_AREA_WIDTH", d.pan_area_width),
            pan_speed: env_parse("INTERACT_PAN_SPEED", d.pan_speed),
            min_pan_speed_factor: env_parse("INTERACT_MIN_PAN_SPEED_FACTOR", d.min_pan_speed_factor),
            max_pan_speed: env_parse("INTERACT_MAX_PAN_SPEED", d.max_pan_speed),
            pan_interval_ms: env_parse("INTERACT_PAN_INTERVAL_MS", d.pan_interval_ms),
            connection_distance_threshold: env_parse(
                "INTERACT_CONNECTION_DISTANCE_THRESHOLD",
                d.connection_distance_threshold,
            ),
            response_distance: env_parse("INTERACT_RESPONSE_DISTANCE", d.response_distance),
            close_distance: env_parse("INTERACT_CLOSE_DISTANCE", d.close_distance),
            together_distance: env_parse("INTERACT_TOGETHER_DISTANCE", d.together_distance),
            withdraw_rate: env_parse("INTERACT_WITHDRAW_RATE", d.withdraw_rate),
            hold_hysteresis: env_parse("INTERACT_HOLD_HYSTERESIS", d.hold_hysteresis),
            thin_edge_width: env_parse("INTERACT_THIN_EDGE_WIDTH", d.thin_edge_width),
            thick_edge_width: env_parse("INTERACT_THICK_EDGE_WIDTH", d.thick_edge_width),
            snap_grid: env_parse_opt("INTERACT_SNAP_GRID"),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON object; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and [`ConfigError::Invalid`]
    /// when the values fail [`Self::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the relationships the attraction and pan math rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("pan_area_width", self.pan_area_width)?;
        positive("pan_speed", self.pan_speed)?;
        positive("max_pan_speed", self.max_pan_speed)?;
        positive("close_distance", self.close_distance)?;
        positive("thin_edge_width", self.thin_edge_width)?;
        positive("thick_edge_width", self.thick_edge_width)?;
        if self.min_pan_speed_factor < 0.0 {
            return Err(invalid("min_pan_speed_factor", "must not be negative"));
        }
        if self.pan_interval_ms == 0 {
            return Err(invalid("pan_interval_ms", "must be at least 1"));
        }
        if self.connection_distance_threshold < 0.0 {
            return Err(invalid("connection_distance_threshold", "must not be negative"));
        }
        if self.hold_hysteresis < 0.0 {
            return Err(invalid("hold_hysteresis", "must not be negative"));
        }
        if self.together_distance <= self.close_distance {
            return Err(invalid("together_distance", "must exceed close_distance"));
        }
        if self.response_distance <= self.together_distance {
            return Err(invalid("response_distance", "must exceed together_distance"));
        }
        if !(self.withdraw_rate > 0.0 && self.withdraw_rate <= 1.0) {
            return Err(invalid("withdraw_rate", "must be in (0, 1]"));
        }
        if let Some(grid) = self.snap_grid {
            positive("snap_grid", grid)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn pan_interval(&self) -> Duration {
        Duration::from_millis(self.pan_interval_ms)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be positive"))
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Like [`env_parse`], but unset or unparseable variables yield `None`.
fn env_parse_opt<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key).map(|raw| raw.parse::<T>()) {
        Ok(Ok(value)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
