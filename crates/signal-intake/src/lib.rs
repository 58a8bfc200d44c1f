//! Signal Sample Intake
//!
//! Accepts one `(ratio_l, ratio_r, timestamp)` sample per video frame from the
//! landmark pipeline, rejects values that would corrupt downstream state, and
//! produces the (optionally smoothed) averaged ratio the detector runs on.

mod error;
mod filter;
mod sample;
mod validator;

pub use error::IntakeError;
pub use filter::MedianFilter;
pub use sample::Sample;
pub use validator::{SignalIntake, ValidationConfig};
