//! Rolling calibration window

use crate::statistics::WindowStats;
use crate::thresholds::Thresholds;
use crate::CalibrationError;
use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// When thresholds are recomputed from the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecalibrationCadence {
    /// At most once per `interval_ms` of sample time
    Interval { interval_ms: u64 },
    /// Once every `every` accepted samples
    Samples { every: u64 },
}

impl Default for RecalibrationCadence {
    fn default() -> Self {
        Self::Interval { interval_ms: 1000 }
    }
}

/// Calibration window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Window capacity W (samples)
    pub capacity: usize,
    /// Samples required before the first calibration
    pub warmup_samples: usize,
    /// Close threshold position within [min, max] (alpha)
    pub close_fraction: f64,
    /// Open threshold position within [min, max] (beta)
    pub open_fraction: f64,
    /// Recalibration cadence
    pub cadence: RecalibrationCadence,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            capacity: 300,      // ~10s @ 30fps
            warmup_samples: 30, // ~1s @ 30fps
            close_fraction: 0.3,
            open_fraction: 0.6,
            cadence: RecalibrationCadence::default(),
        }
    }
}

impl CalibrationConfig {
    /// Check the configuration invariants
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.capacity == 0 {
            return Err(CalibrationError::InvalidCapacity);
        }
        if self.warmup_samples == 0 || self.warmup_samples > self.capacity {
            return Err(CalibrationError::InvalidWarmup {
                warmup: self.warmup_samples,
                capacity: self.capacity,
            });
        }
        let (close, open) = (self.close_fraction, self.open_fraction);
        if !(close.is_finite() && open.is_finite() && 0.0 <= close && close < open && open <= 1.0) {
            return Err(CalibrationError::InvalidFractions { close, open });
        }
        match self.cadence {
            RecalibrationCadence::Samples { every: 0 } => Err(CalibrationError::InvalidCadence(
                "sample cadence must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// What a single `observe` call did to the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// Not enough history yet, no thresholds exist
    Warming,
    /// First thresholds were just derived
    Calibrated,
    /// Thresholds were re-derived on cadence
    Recalibrated,
    /// Thresholds kept from the last calibration
    Frozen,
}

impl CalibrationOutcome {
    /// Whether thresholds changed on this sample
    pub fn recomputed(&self) -> bool {
        matches!(self, Self::Calibrated | Self::Recalibrated)
    }
}

/// Bounded history of averaged ratios plus the thresholds derived from it
#[derive(Debug, Clone)]
pub struct CalibrationWindow {
    config: CalibrationConfig,
    history: RingBuffer<f64>,
    stats: Option<WindowStats>,
    thresholds: Option<Thresholds>,
    last_calibrated_at: Option<u64>,
    /// Start of the current interval; follows the clock backwards
    interval_anchor_ms: u64,
    samples_since_calibration: u64,
}

impl CalibrationWindow {
    /// Create a new calibration window
    pub fn new(config: CalibrationConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self {
            history: RingBuffer::new(config.capacity),
            config,
            stats: None,
            thresholds: None,
            last_calibrated_at: None,
            interval_anchor_ms: 0,
            samples_since_calibration: 0,
        })
    }

    /// Append an averaged ratio and recalibrate if the cadence allows.
    ///
    /// A timestamp earlier than the start of the current interval rebases the
    /// interval at that timestamp, so a clock that jumps backwards delays the
    /// next recalibration by one interval instead of stalling it.
    pub fn observe(&mut self, avg_ratio: f64, timestamp_ms: u64) -> CalibrationOutcome {
        self.history.push(avg_ratio);
        self.samples_since_calibration += 1;

        if self.last_calibrated_at.is_some() && timestamp_ms < self.interval_anchor_ms {
            debug!(
                timestamp_ms,
                anchor_ms = self.interval_anchor_ms,
                "Clock went backwards, rebasing recalibration interval"
            );
            self.interval_anchor_ms = timestamp_ms;
        }

        if self.history.len() < self.config.warmup_samples {
            return CalibrationOutcome::Warming;
        }

        if self.thresholds.is_none() {
            self.recalibrate(timestamp_ms);
            return CalibrationOutcome::Calibrated;
        }

        if self.is_due(timestamp_ms) {
            self.recalibrate(timestamp_ms);
            CalibrationOutcome::Recalibrated
        } else {
            CalibrationOutcome::Frozen
        }
    }

    fn is_due(&self, timestamp_ms: u64) -> bool {
        match self.config.cadence {
            RecalibrationCadence::Interval { interval_ms } => {
                timestamp_ms.saturating_sub(self.interval_anchor_ms) >= interval_ms
            }
            RecalibrationCadence::Samples { every } => self.samples_since_calibration >= every,
        }
    }

    /// Recompute statistics and thresholds over the current window
    fn recalibrate(&mut self, timestamp_ms: u64) {
        let stats = WindowStats::compute(self.history.iter());
        let thresholds =
            Thresholds::derive(&stats, self.config.close_fraction, self.config.open_fraction);

        if thresholds.is_degenerate() {
            warn!(
                value = stats.min,
                samples = stats.count,
                "Calibration window is constant, thresholds collapsed"
            );
        } else {
            debug!(
                min = stats.min,
                max = stats.max,
                avg = stats.avg,
                close = thresholds.close,
                open = thresholds.open,
                "Recalibrated thresholds"
            );
        }

        self.stats = Some(stats);
        self.thresholds = Some(thresholds);
        self.last_calibrated_at = Some(timestamp_ms);
        self.interval_anchor_ms = timestamp_ms;
        self.samples_since_calibration = 0;
    }

    /// Current thresholds, `None` until warm-up completes
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    /// Statistics from the last calibration
    pub fn stats(&self) -> Option<WindowStats> {
        self.stats
    }

    /// Timestamp of the last threshold recomputation
    pub fn last_calibrated_at(&self) -> Option<u64> {
        self.last_calibrated_at
    }

    /// Whether thresholds have been derived at least once
    pub fn is_calibrated(&self) -> bool {
        self.thresholds.is_some()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Window contents, oldest first
    pub fn contents(&self) -> Vec<f64> {
        self.history.to_vec()
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Discard history and thresholds
    pub fn reset(&mut self) {
        self.history.clear();
        self.stats = None;
        self.thresholds = None;
        self.last_calibrated_at = None;
        self.interval_anchor_ms = 0;
        self.samples_since_calibration = 0;
    }
}
