//! Calibration Window
//!
//! Keeps a bounded rolling history of averaged eye ratios and periodically
//! re-derives the close/open hysteresis thresholds from it, so the detector
//! follows slow drift (lighting, head position, per-user eye shape) without
//! reacting to single-frame noise.

mod statistics;
mod thresholds;
mod window;

pub use statistics::WindowStats;
pub use thresholds::Thresholds;
pub use window::{CalibrationConfig, CalibrationOutcome, CalibrationWindow, RecalibrationCadence};

use thiserror::Error;

/// Calibration configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("Window capacity must be at least 1")]
    InvalidCapacity,

    #[error("Warm-up size {warmup} must be in 1..={capacity}")]
    InvalidWarmup { warmup: usize, capacity: usize },

    #[error("Threshold fractions must satisfy 0 <= close ({close}) < open ({open}) <= 1")]
    InvalidFractions { close: f64, open: f64 },

    #[error("Invalid recalibration cadence: {0}")]
    InvalidCadence(String),
}
