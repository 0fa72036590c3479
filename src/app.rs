use std::time::Duration;

use crate::config::ManagerConfig;
use crate::error::{EcsError, Result};
use crate::manager::EntityManager;
use crate::time::Time;

/// Frame driver: one manager plus the clock that feeds it
pub struct App {
    pub manager: EntityManager,
    pub time: Time,
}

impl App {
    pub fn new() -> Self {
        Self {
            manager: EntityManager::new(),
            time: Time::new(),
        }
    }

    pub fn with_config(config: ManagerConfig) -> Result<Self> {
        Ok(Self {
            manager: EntityManager::with_config(config)?,
            time: Time::new(),
        })
    }

    /// Run one frame with the measured wall-clock delta
    pub fn update(&mut self) -> Result<()> {
        self.time.update();
        self.manager.update(self.time.delta_seconds())
    }

    /// Run one frame with an explicit delta in seconds. The clock only
    /// advances when the frame is accepted.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        let delta =
            Duration::try_from_secs_f32(dt).map_err(|_| EcsError::InvalidElapsedTime(dt))?;
        self.manager.update(dt)?;
        self.time.advance(delta);
        Ok(())
    }

    /// Run `frames` frames of `dt` seconds each
    pub fn run_frames(&mut self, frames: usize, dt: f32) -> Result<()> {
        for _ in 0..frames {
            self.step(dt)?;
        }
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
