//! Simulation configuration for a ballpit ensemble.
//!
//! A configuration is loaded from JSON (camelCase keys, missing keys take
//! their defaults) and validated before any ensemble is built from it, so
//! non-finite or out-of-range values never reach the stepper.
//!
//! ```json
//! {
//!   "count": 120,
//!   "gravity": 0.5,
//!   "friction": 0.9975,
//!   "wallBounce": 0.95,
//!   "maxVelocity": 0.15,
//!   "colors": [16711680, 65280, 255]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest accepted particle count. Contact resolution is quadratic in it.
pub const MAX_COUNT: usize = 10_000;

/// Largest accepted half-extent. Sampling `[-e, e]` must stay finite.
pub const MAX_EXTENT: f32 = f32::MAX / 4.0;

/// Configuration error with the field that failed, if any
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Options for one ensemble. Replaced wholesale to reconfigure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub count: usize,
    /// RGB hex colours forming the instance gradient
    pub colors: Vec<u32>,
    pub min_size: f32,
    pub max_size: f32,
    pub size0: f32,
    /// 0 switches the Y walls to symmetric containment
    pub gravity: f32,
    pub friction: f32,
    pub wall_bounce: f32,
    pub max_velocity: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
    pub control_sphere0: bool,
    /// Hide particle 0 when false
    pub follow_cursor: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            count: 70,
            colors: vec![0x000000, 0x000000, 0x000000],
            min_size: 0.5,
            max_size: 1.0,
            size0: 1.0,
            gravity: 0.0,
            friction: 0.9975,
            wall_bounce: 0.95,
            max_velocity: 0.15,
            max_x: 5.0,
            max_y: 5.0,
            max_z: 2.0,
            control_sphere0: false,
            follow_cursor: true,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save the config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values that would feed NaN or Infinity into the stepper
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count > MAX_COUNT {
            return Err(ConfigError::invalid(
                "count",
                format!("{} exceeds the maximum of {}", self.count, MAX_COUNT),
            ));
        }

        let scalars = [
            ("minSize", self.min_size),
            ("maxSize", self.max_size),
            ("size0", self.size0),
            ("gravity", self.gravity),
            ("friction", self.friction),
            ("wallBounce", self.wall_bounce),
            ("maxVelocity", self.max_velocity),
            ("maxX", self.max_x),
            ("maxY", self.max_y),
            ("maxZ", self.max_z),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("{} is not finite", value)));
            }
        }

        if self.friction <= 0.0 || self.friction > 1.0 {
            return Err(ConfigError::invalid(
                "friction",
                format!("{} is outside (0, 1]", self.friction),
            ));
        }
        if !(0.0..=1.0).contains(&self.wall_bounce) {
            return Err(ConfigError::invalid(
                "wallBounce",
                format!("{} is outside [0, 1]", self.wall_bounce),
            ));
        }
        if self.max_velocity < 0.0 {
            return Err(ConfigError::invalid("maxVelocity", "must not be negative"));
        }
        for (field, extent) in [("maxX", self.max_x), ("maxY", self.max_y), ("maxZ", self.max_z)] {
            if extent < 0.0 {
                return Err(ConfigError::invalid(field, "half-extent must not be negative"));
            }
            // Placement samples across the full width
            if extent > MAX_EXTENT {
                return Err(ConfigError::invalid(
                    field,
                    format!("half-extent {} is too large", extent),
                ));
            }
        }
        if self.min_size <= 0.0 {
            return Err(ConfigError::invalid("minSize", "radius must be positive"));
        }
        if self.max_size < self.min_size {
            return Err(ConfigError::invalid(
                "maxSize",
                format!("{} is smaller than minSize {}", self.max_size, self.min_size),
            ));
        }
        if self.size0 <= 0.0 {
            return Err(ConfigError::invalid("size0", "radius must be positive"));
        }

        Ok(())
    }

    /// Copy with a different particle count
    pub fn with_count(&self, count: usize) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    /// Copy with new X/Y half-extents, as derived from the world size
    pub fn with_bounds(&self, max_x: f32, max_y: f32) -> Self {
        Self {
            max_x,
            max_y,
            ..self.clone()
        }
    }

    /// Copy with particle 0 driven (or released) by the pointer
    pub fn with_control_sphere0(&self, control_sphere0: bool) -> Self {
        Self {
            control_sphere0,
            ..self.clone()
        }
    }
}
