//! Core engine implementation
//!
//! The engine owns the scene and the frame timer and runs the loop:
//! application update, transform propagation with uploads, application
//! render. Scene invariant failures end the loop: they are logged here and
//! returned to the caller, never retried.

use thiserror::Error;

use crate::application::Application;
use crate::config::ConfigError;
use crate::core::config::ApplicationConfig;
use crate::foundation::time::{FrameStats, Timer};
use crate::render::FrameUploader;
use crate::scene::{FrameReport, Scene, SceneError};

/// Totals reported when the loop ends normally
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    /// Frames executed
    pub frames: u64,
    /// Object constant uploads across all frames
    pub objects_uploaded: usize,
    /// Average frame rate over the last frames
    pub average_fps: f32,
}

/// Main engine struct
///
/// Coordinates the scene, the renderer seam and frame timing.
pub struct Engine {
    /// Scene being driven
    pub scene: Scene,

    /// Renderer seam receiving per-frame changes
    uploader: Box<dyn FrameUploader>,

    /// Frame timing
    timer: Timer,

    /// Rolling frame rate
    stats: FrameStats,

    /// Loaded configuration
    config: ApplicationConfig,

    /// Whether the engine should continue running
    running: bool,

    frames: u64,
    objects_uploaded: usize,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: ApplicationConfig, uploader: Box<dyn FrameUploader>) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing engine...");

        let mut timer = Timer::new();
        if config.engine.paused_on_start {
            timer.pause();
        }

        Ok(Self {
            scene: Scene::new(),
            uploader,
            timer,
            stats: FrameStats::new(),
            config,
            running: true,
            frames: 0,
            objects_uploaded: 0,
        })
    }

    /// Run the engine main loop with the given application
    pub fn run<T: Application>(
        config: ApplicationConfig,
        uploader: Box<dyn FrameUploader>,
        app: &mut T,
    ) -> Result<RunSummary, EngineError> {
        let mut engine = Self::new(config, uploader)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;

        engine.scene.initialize().map_err(|e| engine.abort(e))?;

        log::info!("Starting main loop...");

        while engine.running {
            engine.timer.tick();
            let delta_time = engine.frame_delta();

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

            let report = engine.update(delta_time)?;

            app.render(&mut engine, &report)
                .map_err(|e| EngineError::ApplicationError(format!("App render: {}", e)))?;

            if engine.config.engine.max_frames.is_some_and(|max| engine.frames >= max) {
                log::info!("Frame limit of {} reached", engine.frames);
                engine.running = false;
            }
        }

        app.cleanup(&mut engine);
        engine.scene.teardown(engine.uploader.as_mut());

        let summary = engine.summary();
        log::info!(
            "Engine shutdown complete: {} frames, {} object uploads, {:.1} fps",
            summary.frames, summary.objects_uploaded, summary.average_fps
        );
        Ok(summary)
    }

    /// Propagate transforms and push changes for one frame
    fn update(&mut self, delta_time: f32) -> Result<FrameReport, EngineError> {
        let report = match self.scene.update(delta_time, self.uploader.as_mut()) {
            Ok(report) => report,
            Err(e) => return Err(self.abort(e)),
        };

        self.frames += 1;
        self.objects_uploaded += report.objects_uploaded;
        self.stats.record(delta_time);
        Ok(report)
    }

    fn abort(&mut self, error: SceneError) -> EngineError {
        log::error!("Scene invariant violated at frame {}: {}", self.frames, error);
        self.running = false;
        EngineError::Scene(error)
    }

    fn frame_delta(&self) -> f32 {
        if self.timer.is_paused() {
            return 0.0;
        }
        self.config.engine.fixed_delta_time.unwrap_or_else(|| self.timer.delta_time())
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Freeze animation time; frames keep running with a zero delta
    pub fn pause(&mut self) {
        self.timer.pause();
    }

    /// Resume animation time
    pub fn resume(&mut self) {
        self.timer.unpause();
    }

    /// Whether animation time is frozen
    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    /// Get the scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Loaded configuration
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Rolling frame statistics
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Running totals
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames,
            objects_uploaded: self.objects_uploaded,
            average_fps: self.stats.fps(),
        }
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene invariant violated; the run was aborted
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::core::config::EngineConfig;
    use crate::foundation::math::Vec3;
    use crate::render::RecordingUploader;
    use crate::scene::{spin, GeometryHandle, Object, ObjectHandle};

    #[derive(Default)]
    struct SpinApp {
        object: Option<ObjectHandle>,
        updates: u32,
        renders: u32,
        cleaned: bool,
        quit_after: Option<u32>,
        remove_object_at: Option<u32>,
    }

    impl Application for SpinApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let scene = engine.scene_mut();
            let object = scene.add_object(Object::new(GeometryHandle(9), 0, 0));
            let root = scene.graph().root();
            scene.graph_mut().at(root).transform_fn(spin(Vec3::y(), 1.0))?.insert(object)?;
            self.object = Some(object);
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.updates += 1;
            if self.quit_after == Some(self.updates) {
                engine.quit();
            }
            if self.remove_object_at == Some(self.updates) {
                if let Some(object) = self.object {
                    engine.scene_mut().leaves_mut().remove_object(object);
                }
            }
            Ok(())
        }

        fn render(&mut self, _engine: &mut Engine, _report: &FrameReport) -> Result<(), AppError> {
            self.renders += 1;
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned = true;
        }
    }

    fn config(max_frames: u64) -> ApplicationConfig {
        ApplicationConfig {
            engine: EngineConfig::new().with_max_frames(max_frames).with_fixed_delta_time(0.5),
            ..ApplicationConfig::default()
        }
    }

    #[test]
    fn test_run_stops_at_frame_limit() {
        let mut app = SpinApp::default();
        let summary = Engine::run(config(4), Box::new(RecordingUploader::new()), &mut app).unwrap();

        assert_eq!(summary.frames, 4);
        // Forced first frame plus three spinning frames
        assert_eq!(summary.objects_uploaded, 4);
        assert_eq!(app.updates, 4);
        assert_eq!(app.renders, 4);
        assert!(app.cleaned);
        assert!((summary.average_fps - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_quit_ends_loop() {
        let mut app = SpinApp { quit_after: Some(2), ..SpinApp::default() };
        let summary = Engine::run(config(100), Box::new(RecordingUploader::new()), &mut app).unwrap();
        assert_eq!(summary.frames, 2);
    }

    #[test]
    fn test_paused_start_uploads_only_first_frame() {
        let mut config = config(3);
        config.engine.paused_on_start = true;
        let mut app = SpinApp::default();

        let summary = Engine::run(config, Box::new(RecordingUploader::new()), &mut app).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.objects_uploaded, 1);
    }

    #[test]
    fn test_scene_error_aborts_run() {
        let mut app = SpinApp { remove_object_at: Some(2), ..SpinApp::default() };
        let result = Engine::run(config(10), Box::new(RecordingUploader::new()), &mut app);

        assert!(matches!(result, Err(EngineError::Scene(SceneError::StalePayload(_)))));
        assert!(!app.cleaned);
        assert_eq!(app.updates, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ApplicationConfig::default();
        config.camera.near = -1.0;
        let result = Engine::new(config, Box::new(RecordingUploader::new()));
        assert!(matches!(result, Err(EngineError::Config(ConfigError::Invalid(_)))));
    }
}
