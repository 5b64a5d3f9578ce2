//! Time management utilities

use std::time::{Duration, Instant};

use crate::foundation::collections::RingBuffer;

/// Frame timer with pause support
///
/// `tick` is called once per frame. While paused, `delta_time` reports zero
/// and paused spans are excluded from `total_time`, so animation callbacks fed
/// from this timer freeze in place.
#[derive(Debug, Clone)]
pub struct Timer {
    base_time: Instant,
    previous: Instant,
    stopped_at: Option<Instant>,
    paused_total: Duration,
    delta_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new running timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            base_time: now,
            previous: now,
            stopped_at: None,
            paused_total: Duration::ZERO,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to the next frame
    pub fn tick(&mut self) {
        self.frame_count += 1;

        if self.stopped_at.is_some() {
            self.delta_time = 0.0;
            return;
        }

        let now = Instant::now();
        self.delta_time = now.duration_since(self.previous).as_secs_f32();
        self.previous = now;
    }

    /// Restart the timer from zero, running
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Stop the clock; `delta_time` is zero until `unpause`
    pub fn pause(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
            self.delta_time = 0.0;
            log::debug!("Timer paused at {:.3}s", self.total_time());
        }
    }

    /// Resume the clock without counting the paused span
    pub fn unpause(&mut self) {
        if let Some(stopped) = self.stopped_at.take() {
            let now = Instant::now();
            self.paused_total += now.duration_since(stopped);
            self.previous = now;
            log::debug!("Timer resumed at {:.3}s", self.total_time());
        }
    }

    /// Whether the timer is paused
    pub fn is_paused(&self) -> bool {
        self.stopped_at.is_some()
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds elapsed since creation or reset, excluding paused spans
    pub fn total_time(&self) -> f32 {
        let end = self.stopped_at.unwrap_or(self.previous);
        end.duration_since(self.base_time)
            .saturating_sub(self.paused_total)
            .as_secs_f32()
    }

    /// Number of ticks since creation or reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Simple stopwatch for measuring elapsed time
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed + self.start_time.map_or(Duration::ZERO, |start| start.elapsed())
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

/// Number of frames averaged by [`FrameStats`]
pub const FRAME_STATS_WINDOW: usize = 60;

/// Sliding-window frame rate statistics
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    samples: RingBuffer<f32, FRAME_STATS_WINDOW>,
    recorded: usize,
}

impl FrameStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame duration in seconds
    pub fn record(&mut self, delta_time: f32) {
        *self.samples.current_mut() = delta_time;
        self.samples.advance();
        self.recorded = (self.recorded + 1).min(FRAME_STATS_WINDOW);
    }

    /// Average milliseconds per frame over the window
    pub fn millis_per_frame(&self) -> f32 {
        if self.recorded == 0 {
            return 0.0;
        }
        let total: f32 = self.samples.iter().take(self.recorded).sum();
        total / self.recorded as f32 * 1000.0
    }

    /// Average frames per second over the window
    pub fn fps(&self) -> f32 {
        let mspf = self.millis_per_frame();
        if mspf > 0.0 {
            1000.0 / mspf
        } else {
            0.0
        }
    }
}
