//! Host configuration
//!
//! Loaded from TOML. Every field has a default, so a config file only needs
//! the keys it changes:
//!
//! ```toml
//! api_key = "..."
//! animation_duration_ms = 250
//! max_zoom = 18.0
//!
//! [default_camera]
//! target = [52.52, 13.40]
//! zoom = 11.0
//! ```

use fmap_core::{CameraPosition, ZoomRange};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest camera animation the host accepts.
const MAX_ANIMATION_MS: u64 = 10_000;

/// Configuration for a [`MapHost`](crate::MapHost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Key handed to the native map SDK. Surfaces cannot be created without one.
    pub api_key: Option<String>,

    /// Camera a surface starts at when the creation request names none.
    pub default_camera: CameraPosition,

    /// Length of `camera#animate` transitions.
    pub animation_duration_ms: u64,

    /// Zoom clamp applied to surfaces that do not request their own.
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,

    /// Whether the location permission is already granted at startup.
    pub location_permission_granted: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_camera: CameraPosition::default(),
            animation_duration_ms: 300,
            min_zoom: None,
            max_zoom: None,
            location_permission_granted: false,
        }
    }
}

impl HostConfig {
    /// Runs without any platform SDK: a placeholder key and the location
    /// permission granted, so every feature can be exercised headless.
    pub fn offline() -> Self {
        Self {
            api_key: Some("offline".into()),
            location_permission_granted: true,
            ..Self::default()
        }
    }

    /// Load from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid("api_key is blank".into()));
            }
        }
        if self.animation_duration_ms > MAX_ANIMATION_MS {
            return Err(ConfigError::Invalid(format!(
                "animation_duration_ms {} exceeds {}",
                self.animation_duration_ms, MAX_ANIMATION_MS
            )));
        }
        self.default_camera
            .normalized()
            .map_err(|e| ConfigError::Invalid(format!("default_camera: {e}")))?;
        self.zoom_range()?;
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// The configured default zoom clamp.
    pub fn zoom_range(&self) -> Result<ZoomRange, ConfigError> {
        ZoomRange::new(self.min_zoom, self.max_zoom)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
