//! Hysteresis thresholds derived from window statistics

use crate::statistics::WindowStats;
use serde::{Deserialize, Serialize};

/// Close/open decision thresholds.
///
/// `open >= close` always holds; the two are equal only for a degenerate window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this the eyes are closed
    pub close: f64,
    /// At or above this the eyes are open
    pub open: f64,
}

impl Thresholds {
    /// Fixed thresholds, mostly useful for driving the classifier directly.
    ///
    /// Arguments are swapped if given in the wrong order.
    pub fn new(close: f64, open: f64) -> Self {
        if open >= close {
            Self { close, open }
        } else {
            Self {
                close: open,
                open: close,
            }
        }
    }

    /// Derive thresholds from window statistics and the configured fractions.
    ///
    /// A constant window (`max == min`) collapses both thresholds onto its
    /// single value. No absolute tolerance is applied, since ratio units are
    /// whatever the landmark pipeline produces.
    pub fn derive(stats: &WindowStats, close_fraction: f64, open_fraction: f64) -> Self {
        if stats.max <= stats.min {
            return Self {
                close: stats.min,
                open: stats.min,
            };
        }
        let range = stats.range();
        Self {
            close: stats.min + close_fraction * range,
            open: stats.min + open_fraction * range,
        }
    }

    /// Width of the hysteresis band
    pub fn band(&self) -> f64 {
        self.open - self.close
    }

    /// No usable band: the signal has been constant over the window, or the
    /// range was too small for the fractions to separate after rounding
    pub fn is_degenerate(&self) -> bool {
        self.band() <= 0.0
    }
}
