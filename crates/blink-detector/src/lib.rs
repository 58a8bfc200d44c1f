//! Blink Detection Engine
//!
//! Turns per-frame eye-aspect-ratio samples into a de-bounced stream of
//! eye states and counted blinks:
//! - Sample intake and validation (non-finite frames are dropped)
//! - Adaptive calibration window deriving close/open thresholds
//! - Five-state hysteresis classifier
//! - Exactly-once blink cycle counting

pub mod config;
pub mod counter;
pub mod shared;
pub mod snapshot;
pub mod state;

pub use crate::config::EngineConfig;
pub use counter::{BlinkCounter, BlinkEvent};
pub use shared::SharedEngine;
pub use snapshot::EngineSnapshot;
pub use state::{classify, EyeState, HysteresisMachine, Transition};

pub use calibration::{RecalibrationCadence, Thresholds};
pub use signal_intake::Sample;

use calibration::{CalibrationError, CalibrationOutcome, CalibrationWindow};
use signal_intake::{IntakeError, SignalIntake};
use thiserror::Error;
use tracing::{debug, info};

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Engine lock poisoned")]
    LockPoisoned,
}

/// Blink detection engine.
///
/// Single writer: every mutation goes through [`BlinkEngine::update`] or
/// [`BlinkEngine::reset`]; readers get [`EngineSnapshot`] copies.
pub struct BlinkEngine {
    config: EngineConfig,
    intake: SignalIntake,
    window: CalibrationWindow,
    machine: HysteresisMachine,
    counter: BlinkCounter,
    latest: Option<Sample>,
    avg_ratio: f64,
    rejected_samples: u64,
    last_transition: Option<Transition>,
}

impl BlinkEngine {
    /// Create a new engine with configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            intake: SignalIntake::new(config.validation_config())?,
            window: CalibrationWindow::new(config.calibration_config())?,
            machine: HysteresisMachine::new(),
            counter: BlinkCounter::new(),
            latest: None,
            avg_ratio: 0.0,
            rejected_samples: 0,
            last_transition: None,
            config,
        })
    }

    /// Process one frame and return the resulting snapshot.
    ///
    /// Invalid samples are dropped without touching the window or state.
    pub fn update(&mut self, sample: Sample) -> EngineSnapshot {
        let avg_ratio = match self.intake.accept(&sample) {
            Ok(avg) => avg,
            Err(e) => {
                self.rejected_samples += 1;
                metrics::counter!("blink_engine_samples_rejected_total", "reason" => e.reason())
                    .increment(1);
                debug!(
                    reason = e.reason(),
                    rejected = self.rejected_samples,
                    "Frame dropped, window and state unchanged"
                );
                return self.snapshot();
            }
        };

        let at_ms = sample.timestamp_ms;
        if let Some(prev) = self.latest {
            if at_ms < prev.timestamp_ms {
                debug!(at_ms, previous_ms = prev.timestamp_ms, "Sample timestamp went backwards");
            }
        }
        self.latest = Some(sample);
        self.avg_ratio = avg_ratio;

        let outcome = self.window.observe(avg_ratio, at_ms);
        if outcome == CalibrationOutcome::Calibrated {
            info!(
                samples = self.window.len(),
                at_ms, "Calibration complete, classification enabled"
            );
        }
        if outcome.recomputed() {
            metrics::counter!("blink_engine_recalibrations_total").increment(1);
        }

        let Some(thresholds) = self.window.thresholds() else {
            return self.snapshot();
        };

        if let Some(transition) = self.machine.step(avg_ratio, thresholds, at_ms) {
            debug!(
                from = %transition.from,
                to = %transition.to,
                avg_ratio,
                at_ms,
                "Eye state transition"
            );

            if let Some(event) = self.counter.observe(transition.from, transition.to, at_ms) {
                debug!(blink = event.blink_number, at_ms, "Blink completed");
                metrics::counter!("blink_engine_blinks_total").increment(1);
            }

            self.last_transition = Some(transition);
        }

        self.snapshot()
    }

    /// Current state as a value copy
    pub fn snapshot(&self) -> EngineSnapshot {
        let thresholds = self.window.thresholds();
        let stats = self.window.stats();
        let (ratio_l, ratio_r) = self
            .latest
            .map_or((0.0, 0.0), |s| (s.ratio_l, s.ratio_r));

        EngineSnapshot {
            state: self.machine.state(),
            ratio_l,
            ratio_r,
            avg_ratio: self.avg_ratio,
            close_t: thresholds.map(|t| t.close),
            open_t: thresholds.map(|t| t.open),
            window_min: stats.map(|s| s.min),
            window_max: stats.map(|s| s.max),
            window_avg: stats.map(|s| s.avg),
            window_len: self.window.len(),
            blinks: self.counter.blinks(),
            last_blink_at: self.counter.last_blink_at(),
            last_calibrated_at: self.window.last_calibrated_at(),
            rejected_samples: self.rejected_samples,
        }
    }

    /// Start a new session: state back to `Unknown`, counters and calibration cleared
    pub fn reset(&mut self) {
        self.intake.reset();
        self.window.reset();
        self.machine.reset();
        self.counter.reset();
        self.latest = None;
        self.avg_ratio = 0.0;
        self.rejected_samples = 0;
        self.last_transition = None;
        info!("Blink engine reset");
    }

    pub fn state(&self) -> EyeState {
        self.machine.state()
    }

    pub fn blinks(&self) -> u64 {
        self.counter.blinks()
    }

    /// Most recent state change, if any since reset
    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
