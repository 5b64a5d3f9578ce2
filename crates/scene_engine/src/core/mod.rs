//! # Core Engine Module
//!
//! Shared configuration for the frame loop and the scene camera.

pub mod config;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    EngineConfig,
    CameraConfig,
    Config,
    ConfigError,
};
