//! Orbit demo application
//!
//! Builds a small scene (a spinning centerpiece, two static satellites, two
//! lights, one counter-rotating) and orbits the camera around it. Runs
//! headless: the renderer seam counts what a GPU backend would upload.
//!
//! Usage: `orbit_demo [config.toml|config.ron]`

use std::cell::Cell;
use std::rc::Rc;

use scene_engine::config::ConfigError;
use scene_engine::foundation::logging;
use scene_engine::foundation::math::constants;
use scene_engine::prelude::*;
use scene_engine::render::LightConstants;
use scene_engine::scene::{CameraHandle, LightHandle, MaterialConstants, ObjectHandle, Payload, SharedOrbitInput};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "orbit_demo.toml";
const DEFAULT_MAX_FRAMES: u64 = 600;
const REPORT_INTERVAL: u64 = 120;

/// Radians of yaw added each time the orbit input moves
const YAW_STEP: f32 = 0.05;
/// Frames between orbit input changes
const ORBIT_INTERVAL: u64 = 4;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// Uploader standing in for a GPU backend
#[derive(Debug, Default)]
struct CountingUploader {
    materials: usize,
    objects: usize,
    lights: usize,
    views: usize,
    released: usize,
}

impl FrameUploader for CountingUploader {
    fn upload_object(&mut self, slot: usize, object: ObjectHandle, constants: &ObjectConstants) {
        log::trace!("Object {:?} -> slot {} (translation {:?})", object, slot, constants.model[3]);
        self.objects += 1;
    }

    fn upload_material(&mut self, index: usize, constants: &MaterialConstants) {
        log::debug!("Material {} shininess {}", index, constants.shininess);
        self.materials += 1;
    }

    fn upload_light(&mut self, light: LightHandle, constants: &LightConstants) {
        log::trace!("Light {:?} color {:?}", light, constants.color);
        self.lights += 1;
    }

    fn upload_camera(&mut self, camera: CameraHandle, _view: &Mat4) {
        log::trace!("Camera {:?} view rebuilt", camera);
        self.views += 1;
    }

    fn release_geometry(&mut self, _object: ObjectHandle, geometry: GeometryHandle) {
        log::debug!("Releasing geometry {:?}", geometry);
        self.released += 1;
    }
}

impl Drop for CountingUploader {
    fn drop(&mut self) {
        log::info!(
            "Uploader totals: {} material, {} object, {} light, {} view uploads; {} geometries released",
            self.materials, self.objects, self.lights, self.views, self.released
        );
    }
}

struct OrbitApp {
    orbit_input: SharedOrbitInput,
    camera: Option<CameraHandle>,
    frame: u64,
}

impl OrbitApp {
    fn new() -> Self {
        Self {
            orbit_input: Rc::new(Cell::new(OrbitInput::default())),
            camera: None,
            frame: 0,
        }
    }
}

impl Application for OrbitApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Building orbit demo scene...");
        let camera_config = engine.config().camera.clone();
        let scene = engine.scene_mut();

        let pearl = scene.add_material(Material::pearl());
        let ruby = scene.add_material(Material::ruby());

        let centerpiece = scene.add_object(Object::new(GeometryHandle(1), ruby, 0));
        let left = scene.add_object(Object::new(GeometryHandle(2), pearl, 0));
        let right = scene.add_object(Object::new(GeometryHandle(2), pearl, 0));

        let key_light = scene.add_light(
            Light::directional(Vec3::new(-0.5, -1.0, -0.5)).with_color(Vec4::new(1.0, 0.95, 0.9, 1.0)),
        );
        let rim_light = scene.add_light(
            Light::directional(Vec3::new(0.0, 0.0, -1.0)).with_color(Vec4::new(0.3, 0.4, 1.0, 1.0)),
        );

        let camera = scene.add_camera(Camera::from_config(&camera_config));
        self.camera = Some(camera);

        let graph = scene.graph_mut();
        let root = graph.root();

        graph
            .at(root)
            .transform_rotation_fn(Quat::identity(), spin(Vec3::y(), 0.5))?
            .insert(centerpiece)?;

        let satellites = graph.at(root).branch()?.handle();
        graph
            .at(satellites)
            .transform_matrix(Mat4::new_translation(&Vec3::new(-1.5, 0.0, 0.0)))?
            .insert(left)?;
        graph
            .at(satellites)
            .transform_matrix(Mat4::new_translation(&Vec3::new(1.5, 0.0, 0.0)))?
            .insert(right)?;

        graph.at(root).transform()?.insert(key_light)?;
        graph.at(root).transform_fn(spin(Vec3::y(), -0.5))?.insert(rim_light)?;

        graph
            .at(root)
            .transform_fn(orbit(Rc::clone(&self.orbit_input)))?
            .insert(Payload::CameraPosition(camera))?;
        graph.at(root).insert(Payload::CameraFocus(camera))?;

        log::info!("Scene graph built with {} nodes", graph.len());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        self.frame += 1;

        // Stepped input, so most frames leave the camera subtree clean
        if self.frame % ORBIT_INTERVAL == 0 {
            let mut input = self.orbit_input.get();
            input.yaw = (input.yaw + YAW_STEP) % constants::TAU;
            self.orbit_input.set(input);
        }

        // Freeze animation for a stretch to show idle frames
        if self.frame == REPORT_INTERVAL * 2 {
            log::info!("Pausing animation");
            engine.pause();
        } else if self.frame == REPORT_INTERVAL * 3 {
            log::info!("Resuming animation");
            engine.resume();
        }

        Ok(())
    }

    fn render(&mut self, engine: &mut Engine, report: &FrameReport) -> Result<(), AppError> {
        if self.frame % REPORT_INTERVAL != 0 {
            return Ok(());
        }

        let eye = match self.camera {
            Some(camera) => engine.scene().camera(camera)?.eye_position()?,
            None => Vec3::zeros(),
        };
        log::info!(
            "Frame {}: {:.1} fps, {} objects / {} lights uploaded, eye at ({:.2}, {:.2}, {:.2})",
            self.frame,
            engine.stats().fps(),
            report.objects_uploaded,
            report.lights_uploaded,
            eye.x, eye.y, eye.z
        );
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!("Orbit demo finished after {} frames", engine.frame_count());
    }
}

fn run() -> Result<(), DemoError> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let mut config = ApplicationConfig::load_or_default(&path)?;
    config.validate()?;
    if config.engine.max_frames.is_none() {
        config.engine.max_frames = Some(DEFAULT_MAX_FRAMES);
    }

    logging::init_with_level(&config.engine.log_level);
    log::info!("Starting orbit demo with config {}", path);

    let mut app = OrbitApp::new();
    let summary = Engine::run(config, Box::new(CountingUploader::default()), &mut app)?;
    log::info!(
        "Run summary: {} frames, {} object uploads, {:.1} fps",
        summary.frames, summary.objects_uploaded, summary.average_fps
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        // Logging may not be up yet when the config fails to load
        logging::init_with_level("error");
        log::error!("Orbit demo failed: {}", e);
        eprintln!("orbit_demo: {}", e);
        std::process::exit(1);
    }
}
