//! Intake Error Types

use thiserror::Error;

/// Reasons a sample is refused by the intake stage
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    /// NaN or infinite ratio
    #[error("{field} is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Ratios are openness measures and cannot be negative
    #[error("{field} is negative: {value}")]
    Negative { field: &'static str, value: f64 },

    /// Value above the configured plausibility ceiling
    #[error("{field} value {value} exceeds plausible maximum {max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },

    /// Each eye is finite but the pair is beyond f64 headroom
    #[error("ratio_l + ratio_r overflows: {ratio_l} + {ratio_r}")]
    SumOverflow { ratio_l: f64, ratio_r: f64 },

    /// Averaged ratio came out NaN or infinite
    #[error("averaged ratio is not finite: {0}")]
    NonFiniteAverage(f64),

    /// Smoothing filter misconfigured
    #[error("Invalid filter configuration: {0}")]
    InvalidFilter(String),
}

impl IntakeError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NonFinite { .. } => "non_finite",
            Self::Negative { .. } => "negative",
            Self::OutOfRange { .. } => "out_of_range",
            Self::SumOverflow { .. } => "sum_overflow",
            Self::NonFiniteAverage(_) => "non_finite_average",
            Self::InvalidFilter(_) => "invalid_filter",
        }
    }
}
