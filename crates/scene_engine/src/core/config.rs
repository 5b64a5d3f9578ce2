//! # Unified Configuration System
//!
//! Configuration for the frame loop and the default scene camera. Files can be
//! TOML or RON (see [`Config`]); every section falls back to its defaults when
//! omitted, so a config file only needs the values it changes.
//!
//! ```toml
//! [engine]
//! log_level = "debug"
//! max_frames = 600
//! fixed_delta_time = 0.016
//!
//! [camera]
//! position = [0.0, 0.0, 3.0]
//! fov_degrees = 60.0
//! ```

use serde::{Serialize, Deserialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Frame loop behavior: logging, frame budget, time source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Stop after this many frames (`None` runs until the application quits)
    pub max_frames: Option<u64>,
    /// Feed this delta to every frame instead of wall-clock time
    pub fixed_delta_time: Option<f32>,
    /// Start with the frame timer paused
    pub paused_on_start: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            max_frames: None,
            fixed_delta_time: None,
            paused_on_start: false,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Limit the number of frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Use a fixed time step
    pub fn with_fixed_delta_time(mut self, delta_time: f32) -> Self {
        self.fixed_delta_time = Some(delta_time);
        self
    }

    /// Start paused
    pub fn with_paused_on_start(mut self, paused: bool) -> Self {
        self.paused_on_start = paused;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.is_empty() {
            return Err(ConfigError::Invalid("log level cannot be empty".to_string()));
        }

        if let Some(dt) = self.fixed_delta_time {
            if !dt.is_finite() || dt < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "fixed delta time must be finite and non-negative, got {}",
                    dt
                )));
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Camera Configuration
///
/// Initial placement of the scene camera before any graph transform is
/// applied, plus the projection parameters handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Base position of the camera position anchor
    pub position: Vec3,
    /// Base position of the camera focus anchor
    pub focus: Vec3,
    /// Fixed up vector
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl CameraConfig {
    /// Builder pattern: set base position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: set base focus point
    pub fn with_focus(mut self, focus: Vec3) -> Self {
        self.focus = focus;
        self
    }

    /// Projection matrix for a viewport aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.fov_degrees), aspect, self.near, self.far)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "field of view must be in (0, 180) degrees, got {}",
                self.fov_degrees
            )));
        }

        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }

        if (self.position - self.focus).norm() <= f32::EPSILON {
            return Err(ConfigError::Invalid("camera position and focus coincide".to_string()));
        }

        if self.up.norm() <= f32::EPSILON {
            return Err(ConfigError::Invalid("camera up vector is zero".to_string()));
        }

        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            focus: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that applications load at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Frame loop configuration
    pub engine: EngineConfig,
    /// Default camera configuration
    pub camera: CameraConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.camera.validate()?;
        Ok(())
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.engine.log_level, "info");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let text = r#"
            [engine]
            max_frames = 10
            fixed_delta_time = 0.5
        "#;
        let config = ApplicationConfig::parse("scene.toml", text).unwrap();

        assert_eq!(config.engine.max_frames, Some(10));
        assert_eq!(config.engine.fixed_delta_time, Some(0.5));
        assert_eq!(config.engine.log_level, "info");
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_ron_camera_section() {
        let text = "(camera: (position: (1.0, 2.0, 3.0), fov_degrees: 45.0))";
        let config = ApplicationConfig::parse("scene.ron", text).unwrap();

        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.fov_degrees, 45.0);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ApplicationConfig::parse("scene.json", "{}");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = ApplicationConfig {
            engine: EngineConfig::new().with_fixed_delta_time(-1.0),
            ..ApplicationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let camera = CameraConfig::default().with_focus(Vec3::new(0.0, 0.0, 3.0));
        assert!(camera.validate().is_err());
    }

    #[test]
    fn test_toml_save_load_roundtrip() {
        let path = std::env::temp_dir().join("scene_engine_config_test.toml");
        let path = path.to_string_lossy().to_string();

        let config = ApplicationConfig {
            engine: EngineConfig::new().with_max_frames(42).with_log_level("debug"),
            camera: CameraConfig::default().with_position(Vec3::new(0.0, 1.0, 4.0)),
        };
        config.save_to_file(&path).unwrap();
        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let loaded = ApplicationConfig::load_or_default("/nonexistent/dir/scene.toml").unwrap();
        assert_eq!(loaded, ApplicationConfig::default());
    }
}
