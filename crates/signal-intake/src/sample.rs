//! Per-frame eye openness sample

use serde::{Deserialize, Serialize};

/// One frame worth of eye-aspect-ratio measurements
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Left eye aspect ratio
    pub ratio_l: f64,
    /// Right eye aspect ratio
    pub ratio_r: f64,
    /// Capture time in milliseconds
    pub timestamp_ms: u64,
}

impl Sample {
    pub fn new(ratio_l: f64, ratio_r: f64, timestamp_ms: u64) -> Self {
        Self {
            ratio_l,
            ratio_r,
            timestamp_ms,
        }
    }

    /// Mean of both eyes, the value the detector classifies.
    ///
    /// Halves before adding so two finite ratios always give a finite mean.
    pub fn avg_ratio(&self) -> f64 {
        self.ratio_l / 2.0 + self.ratio_r / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg_ratio() {
        let sample = Sample::new(0.2, 0.4, 10);
        assert!((sample.avg_ratio() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_avg_ratio_of_huge_values_is_finite() {
        let sample = Sample::new(f64::MAX, f64::MAX, 0);
        assert_eq!(sample.avg_ratio(), f64::MAX);
    }

    #[test]
    fn test_deserialize_frame() {
        let sample: Sample =
            serde_json::from_str(r#"{"ratio_l":0.31,"ratio_r":0.29,"timestamp_ms":1700}"#).unwrap();
        assert_eq!(sample.timestamp_ms, 1700);
        assert!((sample.avg_ratio() - 0.30).abs() < 1e-12);
    }
}
