use serde::{Deserialize, Serialize};

use crate::detector::DetectError;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Rolling window length and z-score cut-off for a detection run.
///
/// Also the `[detector]` section of the application config.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorParams {
    /// Number of trailing observations (current one included) per window.
    pub window: usize,
    /// Absolute z-score that must be exceeded to flag an observation.
    pub threshold: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl DetectorParams {
    pub fn new(window: usize, threshold: f64) -> Result<Self, DetectError> {
        let params = Self { window, threshold };
        params.validate()?;
        Ok(params)
    }

    /// A sample standard deviation needs at least two points, and a threshold
    /// has to be a finite non-negative number to compare against `|z|`.
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.window < 2 {
            return Err(DetectError::WindowTooSmall {
                window: self.window,
            });
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(DetectError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}
