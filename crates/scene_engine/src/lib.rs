//! # Scene Engine
//!
//! Scene graph transform propagation with dirty tracking for real-time
//! renderers.
//!
//! ## Features
//!
//! - **Arena scene graph**: branches, single-child transforms and payload containers
//! - **Dirty minimization**: only subtrees below a changed transform are re-uploaded
//! - **Two-anchor cameras**: eye and focus placed independently in the tree
//! - **Renderer seam**: per-frame changes pushed through a `FrameUploader`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let scene = engine.scene_mut();
//!         let object = scene.add_object(Object::new(GeometryHandle(0), 0, 0));
//!         let root = scene.graph().root();
//!         scene.graph_mut().at(root).transform_fn(spin(Vec3::y(), 1.0))?.insert(object)?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let mut app = MyApp;
//!     Engine::run(config, Box::new(RecordingUploader::new()), &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError, RunSummary};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineError, RunSummary,
        foundation::{
            math::{Vec3, Vec4, Mat4, Mat4Ext, Quat},
            time::{Timer, Stopwatch},
        },
        render::{FrameUploader, ObjectConstants, RecordingUploader},
        scene::{
            orbit, spin, keyframe_path, Keyframe, OrbitInput,
            Camera, FrameReport, GeometryHandle, Light, Material, Object, Scene, SceneError,
            SceneGraph, TransformNode, TransformUpdate,
        },
        core::config::{ApplicationConfig, CameraConfig, EngineConfig, Config},
    };
}
