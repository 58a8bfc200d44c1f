//! Read-only engine snapshot

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::EyeState;

/// Value copy of the engine state after an update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Current eye state
    pub state: EyeState,

    /// Latest accepted left/right ratios (0.0 before the first sample)
    pub ratio_l: f64,
    pub ratio_r: f64,

    /// Averaged (and smoothed) ratio the classifier saw
    pub avg_ratio: f64,

    /// Hysteresis thresholds, absent during warm-up
    pub close_t: Option<f64>,
    pub open_t: Option<f64>,

    /// Window statistics from the last calibration
    pub window_min: Option<f64>,
    pub window_max: Option<f64>,
    pub window_avg: Option<f64>,

    /// Samples currently held by the calibration window
    pub window_len: usize,

    /// Completed blinks this session
    pub blinks: u64,

    /// Timestamp of the most recent blink (ms)
    pub last_blink_at: Option<u64>,

    /// Timestamp of the last threshold recomputation (ms)
    pub last_calibrated_at: Option<u64>,

    /// Samples dropped by validation this session
    pub rejected_samples: u64,
}

impl EngineSnapshot {
    /// Whether thresholds exist yet
    pub fn is_calibrated(&self) -> bool {
        self.close_t.is_some()
    }

    /// Eyes closing or closed
    pub fn is_blinking(&self) -> bool {
        self.state.is_blinking()
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

impl fmt::Display for EngineSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} avg={:.3} close<{} open>{} min={} max={} blinks={}",
            self.state,
            self.avg_ratio,
            fmt_opt(self.close_t),
            fmt_opt(self.open_t),
            fmt_opt(self.window_min),
            fmt_opt(self.window_max),
            self.blinks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uncalibrated() {
        let snapshot = EngineSnapshot::default();
        assert_eq!(snapshot.state, EyeState::Unknown);
        assert!(!snapshot.is_calibrated());
        assert_eq!(snapshot.to_string(), "UNKNOWN avg=0.000 close<- open>- min=- max=- blinks=0");
    }

    #[test]
    fn test_serializes_nulls() {
        let json = serde_json::to_value(EngineSnapshot::default()).unwrap();
        assert!(json["last_blink_at"].is_null());
        assert_eq!(json["state"], "UNKNOWN");
    }
}
