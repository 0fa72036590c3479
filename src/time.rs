//! Frame clock feeding [`EntityManager::update`].
//!
//! ```
//! use scenegraph_ecs::time::Time;
//! use std::time::Duration;
//!
//! let mut time = Time::new();
//! time.advance(Duration::from_millis(16));
//! assert_eq!(time.frame_count(), 1);
//! assert!((time.delta_seconds() - 0.016).abs() < 1e-6);
//! ```
//!
//! [`EntityManager::update`]: crate::manager::EntityManager::update

use std::time::{Duration, Instant};

/// Tracks the delta between frames
#[derive(Clone, Debug)]
pub struct Time {
    delta: Duration,
    elapsed: Duration,
    frame_count: u64,
    /// 1.0 = real time
    time_scale: f32,
    last_update: Instant,
}

impl Time {
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            time_scale: 1.0,
            last_update: Instant::now(),
        }
    }

    /// Measure wall-clock time since the previous tick
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_update);
        self.last_update = now;
        self.tick(delta);
    }

    /// Step by a fixed amount, ignoring the wall clock
    pub fn advance(&mut self, delta: Duration) {
        self.last_update = Instant::now();
        self.tick(delta);
    }

    fn tick(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Scaled delta, the value handed to the manager
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32() * self.time_scale
    }

    /// Unscaled time accumulated over all ticks
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Negative and NaN scales clamp to zero
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_nan() { 0.0 } else { scale.max(0.0) };
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
