//! Engine configuration

use std::path::Path;

use calibration::{CalibrationConfig, RecalibrationCadence};
use serde::{Deserialize, Serialize};
use signal_intake::ValidationConfig;

use crate::EngineError;

/// Environment variable prefix for overrides (e.g. `BLINK_WINDOW_CAPACITY=600`)
pub const ENV_PREFIX: &str = "BLINK";

/// Blink engine configuration, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Calibration window capacity W (samples)
    pub window_capacity: usize,

    /// Samples required before the first classification
    pub warmup_samples: usize,

    /// Close threshold fraction (alpha) within the window range
    pub close_fraction: f64,

    /// Open threshold fraction (beta) within the window range
    pub open_fraction: f64,

    /// Threshold recomputation cadence
    pub recalibration: RecalibrationCadence,

    /// Median filter length over the averaged ratio (odd, 1 = off)
    pub smoothing_window: usize,

    /// Optional plausibility ceiling for a single eye ratio
    pub max_ratio: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_capacity: 300,
            warmup_samples: 30,
            close_fraction: 0.3,
            open_fraction: 0.6,
            recalibration: RecalibrationCadence::Interval { interval_ms: 1000 },
            smoothing_window: 1,
            max_ratio: None,
        }
    }
}

impl EngineConfig {
    /// Short window and fast cadence, follows lighting changes quickly
    pub fn responsive() -> Self {
        Self {
            window_capacity: 150,
            warmup_samples: 15,
            recalibration: RecalibrationCadence::Interval { interval_ms: 500 },
            ..Default::default()
        }
    }

    /// Long window with smoothing, for noisy webcams
    pub fn stable() -> Self {
        Self {
            window_capacity: 600,
            warmup_samples: 60,
            close_fraction: 0.25,
            open_fraction: 0.65,
            recalibration: RecalibrationCadence::Interval { interval_ms: 2000 },
            smoothing_window: 3,
            ..Default::default()
        }
    }

    /// Load from an optional file, then apply `BLINK_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EngineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the engine relies on
    pub fn validate(&self) -> Result<(), EngineError> {
        self.calibration_config().validate()?;

        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(EngineError::Config(format!(
                "smoothing_window must be odd and > 0, got {}",
                self.smoothing_window
            )));
        }

        if let Some(max) = self.max_ratio {
            if !(max.is_finite() && max > 0.0) {
                return Err(EngineError::Config(format!(
                    "max_ratio must be positive and finite, got {max}"
                )));
            }
        }

        Ok(())
    }

    pub fn calibration_config(&self) -> CalibrationConfig {
        CalibrationConfig {
            capacity: self.window_capacity,
            warmup_samples: self.warmup_samples,
            close_fraction: self.close_fraction,
            open_fraction: self.open_fraction,
            cadence: self.recalibration,
        }
    }

    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_ratio: self.max_ratio,
            smoothing_window: self.smoothing_window,
        }
    }
}
