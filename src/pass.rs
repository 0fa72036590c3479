//! Update passes
//!
//! A frame is split into strictly ordered passes. Every entity finishes pass
//! `N` before any entity starts pass `N << 1`.

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, Result};

/// Scheduling tag of a component (power of two)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pass(pub u32);

impl Pass {
    /// Input handling, camera controllers
    pub const EARLY: Pass = Pass(1);
    /// Baseline pass for components that do not declare one
    pub const DEFAULT: Pass = Pass(2);
    /// Runs after everything that depends on simulation output
    pub const LATE: Pass = Pass(4);
    /// Final pass, typically the renderer
    pub const RENDER: Pass = Pass(8);

    pub const MIN: Pass = Pass::EARLY;
    pub const MAX: Pass = Pass::RENDER;

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_power_of_two()
    }
}

impl Default for Pass {
    fn default() -> Self {
        Pass::DEFAULT
    }
}

/// Inclusive range of passes run by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassRange {
    pub min: Pass,
    pub max: Pass,
}

impl PassRange {
    pub fn new(min: Pass, max: Pass) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_valid() || !self.max.is_valid() {
            return Err(EcsError::ConfigError(format!(
                "pass bounds must be powers of two (min={}, max={})",
                self.min.0, self.max.0
            )));
        }
        if self.min > self.max {
            return Err(EcsError::ConfigError(format!(
                "pass min {} exceeds max {}",
                self.min.0, self.max.0
            )));
        }
        Ok(())
    }

    /// Ascending passes: min, min << 1, ... up to and including max
    pub fn iter(&self) -> impl Iterator<Item = Pass> {
        let max = self.max.0;
        std::iter::successors(Some(self.min.0), move |&p| {
            p.checked_mul(2).filter(|next| *next <= max)
        })
        .map(Pass)
    }
}

impl Default for PassRange {
    fn default() -> Self {
        Self {
            min: Pass::MIN,
            max: Pass::MAX,
        }
    }
}
