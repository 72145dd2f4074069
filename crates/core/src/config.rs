//! Engine configuration
//!
//! Configuration can be created programmatically, loaded from a JSON file,
//! or read from environment variables layered over the defaults.

use crate::layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for capture, zoom and label display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Area-closing hit-box radius in screen pixels
    pub close_threshold_px: f64,
    /// Amount added to or removed from the zoom factor per step
    pub zoom_step: f64,
    /// Smallest zoom factor a zoom-out may reach
    pub min_zoom: f64,
    /// Zoom factor a new document starts at
    pub initial_zoom: f64,
    /// Display unit token, e.g. "ft"; areas use "sq <unit>"
    pub unit: String,
    /// Label placement constants
    pub layout: LayoutConfig,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            close_threshold_px: 10.0,
            zoom_step: 0.1,
            min_zoom: 0.1,
            initial_zoom: 1.0,
            unit: "ft".to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl MeasureConfig {
    /// Loads configuration from environment variables over the defaults.
    ///
    /// Environment variables:
    /// - `SCALEMARK_CLOSE_THRESHOLD_PX`: closing hit-box in screen pixels (default: 10)
    /// - `SCALEMARK_ZOOM_STEP`: zoom step (default: 0.1)
    /// - `SCALEMARK_MIN_ZOOM`: minimum zoom (default: 0.1)
    /// - `SCALEMARK_UNIT`: display unit token (default: "ft")
    ///
    /// # Errors
    /// Returns an error if any variable holds an unparsable or invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = env_f64("SCALEMARK_CLOSE_THRESHOLD_PX")? {
            config.close_threshold_px = value;
        }
        if let Some(value) = env_f64("SCALEMARK_ZOOM_STEP")? {
            config.zoom_step = value;
        }
        if let Some(value) = env_f64("SCALEMARK_MIN_ZOOM")? {
            config.min_zoom = value;
        }
        if let Ok(unit) = std::env::var("SCALEMARK_UNIT") {
            config.unit = unit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("close_threshold_px", self.close_threshold_px),
            ("zoom_step", self.zoom_step),
            ("min_zoom", self.min_zoom),
            ("initial_zoom", self.initial_zoom),
            ("layout.font_size_px", self.layout.font_size_px),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue(key.to_string()));
            }
        }
        if self.initial_zoom < self.min_zoom {
            return Err(ConfigError::InvalidValue("initial_zoom".to_string()));
        }
        Ok(())
    }
}

fn env_f64(name: &str) -> Result<Option<f64>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
