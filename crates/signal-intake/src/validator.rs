//! Sample validation and averaged-ratio production

use crate::error::IntakeError;
use crate::filter::MedianFilter;
use crate::sample::Sample;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Optional plausibility ceiling for a single eye ratio.
    /// Ratio units are defined by the landmark pipeline, so this is unset by default.
    pub max_ratio: Option<f64>,
    /// Median filter length over the averaged ratio (odd, 1 = off)
    pub smoothing_window: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_ratio: None,
            smoothing_window: 1,
        }
    }
}

/// Intake stage: validates raw samples and yields the smoothed average
#[derive(Debug, Clone)]
pub struct SignalIntake {
    config: ValidationConfig,
    filter: MedianFilter,
}

impl SignalIntake {
    /// Create a new intake stage with given config
    pub fn new(config: ValidationConfig) -> Result<Self, IntakeError> {
        let filter = MedianFilter::new(config.smoothing_window)?;
        Ok(Self { config, filter })
    }

    /// Check a single ratio field
    pub fn validate_ratio(&self, field: &'static str, value: f64) -> Result<(), IntakeError> {
        if !value.is_finite() {
            return Err(IntakeError::NonFinite { field, value });
        }
        if value < 0.0 {
            return Err(IntakeError::Negative { field, value });
        }
        match self.config.max_ratio {
            Some(max) if value > max => Err(IntakeError::OutOfRange { field, value, max }),
            _ => Ok(()),
        }
    }

    /// Validate both eyes of a sample.
    ///
    /// A pair whose sum overflows is refused even though each eye is finite:
    /// window statistics over such values lose all precision.
    pub fn validate(&self, sample: &Sample) -> Result<(), IntakeError> {
        self.validate_ratio("ratio_l", sample.ratio_l)?;
        self.validate_ratio("ratio_r", sample.ratio_r)?;
        if !(sample.ratio_l + sample.ratio_r).is_finite() {
            return Err(IntakeError::SumOverflow {
                ratio_l: sample.ratio_l,
                ratio_r: sample.ratio_r,
            });
        }
        Ok(())
    }

    /// Validate a sample and return the averaged ratio after smoothing.
    ///
    /// A rejected sample leaves the smoothing history untouched.
    pub fn accept(&mut self, sample: &Sample) -> Result<f64, IntakeError> {
        if let Err(e) = self.validate(sample) {
            debug!(timestamp_ms = sample.timestamp_ms, "Sample rejected: {}", e);
            return Err(e);
        }
        let avg = sample.avg_ratio();
        if !avg.is_finite() {
            debug!(timestamp_ms = sample.timestamp_ms, avg, "Sample rejected: non-finite average");
            return Err(IntakeError::NonFiniteAverage(avg));
        }
        Ok(self.filter.filter(avg))
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Clear smoothing history
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

impl Default for SignalIntake {
    fn default() -> Self {
        Self {
            config: ValidationConfig::default(),
            filter: MedianFilter::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_sample() {
        let mut intake = SignalIntake::default();
        let avg = intake.accept(&Sample::new(0.28, 0.32, 0)).unwrap();
        assert!((avg - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut intake = SignalIntake::default();
        assert!(matches!(
            intake.accept(&Sample::new(f64::NAN, 0.3, 0)),
            Err(IntakeError::NonFinite { field: "ratio_l", .. })
        ));
        assert!(matches!(
            intake.accept(&Sample::new(0.3, f64::INFINITY, 0)),
            Err(IntakeError::NonFinite { field: "ratio_r", .. })
        ));
    }

    #[test]
    fn test_negative_rejected() {
        let intake = SignalIntake::default();
        assert!(matches!(
            intake.validate(&Sample::new(-0.1, 0.3, 0)),
            Err(IntakeError::Negative { .. })
        ));
    }

    #[test]
    fn test_plausibility_ceiling() {
        let intake = SignalIntake::new(ValidationConfig {
            max_ratio: Some(1.0),
            ..Default::default()
        })
        .unwrap();
        assert!(intake.validate(&Sample::new(1.0, 0.9, 0)).is_ok());
        assert!(matches!(
            intake.validate(&Sample::new(0.4, 3.5, 0)),
            Err(IntakeError::OutOfRange { field: "ratio_r", .. })
        ));
    }

    #[test]
    fn test_unbounded_by_default() {
        let intake = SignalIntake::default();
        assert!(intake.validate(&Sample::new(250.0, 310.0, 0)).is_ok());
    }

    #[test]
    fn test_overflowing_pair_rejected() {
        let mut intake = SignalIntake::default();
        assert!(matches!(
            intake.accept(&Sample::new(f64::MAX, f64::MAX, 0)),
            Err(IntakeError::SumOverflow { .. })
        ));
        // Large but summable values still pass
        let avg = intake.accept(&Sample::new(f64::MAX / 4.0, f64::MAX / 4.0, 1)).unwrap();
        assert!(avg.is_finite());
    }

    #[test]
    fn test_rejected_sample_skips_smoothing() {
        let mut intake = SignalIntake::new(ValidationConfig {
            smoothing_window: 3,
            ..Default::default()
        })
        .unwrap();
        intake.accept(&Sample::new(0.3, 0.3, 0)).unwrap();
        intake.accept(&Sample::new(0.3, 0.3, 1)).unwrap();
        assert!(intake.accept(&Sample::new(f64::NAN, 0.3, 2)).is_err());
        let avg = intake.accept(&Sample::new(0.3, 0.3, 3)).unwrap();
        assert!((avg - 0.3).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn rejected_samples_leave_smoothing_untouched(
            ratios in proptest::collection::vec(0.0f64..1.0, 1..40),
            bad_every in 2usize..6,
        ) {
            let config = ValidationConfig {
                smoothing_window: 5,
                ..Default::default()
            };
            let mut clean = SignalIntake::new(config.clone()).unwrap();
            let mut noisy = SignalIntake::new(config).unwrap();

            for (i, r) in ratios.iter().enumerate() {
                if i % bad_every == 0 {
                    prop_assert!(noisy.accept(&Sample::new(f64::NAN, *r, i as u64)).is_err());
                    prop_assert!(noisy.accept(&Sample::new(f64::MAX, f64::MAX, i as u64)).is_err());
                }
                let expected = clean.accept(&Sample::new(*r, *r, i as u64)).unwrap();
                let got = noisy.accept(&Sample::new(*r, *r, i as u64)).unwrap();
                prop_assert_eq!(got, expected);
            }
        }
    }
}
