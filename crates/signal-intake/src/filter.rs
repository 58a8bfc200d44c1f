//! Median Filter for Noise Reduction

use crate::error::IntakeError;

/// Sliding window median filter over the averaged ratio
#[derive(Debug, Clone)]
pub struct MedianFilter {
    window: Vec<f64>,
    size: usize,
    position: usize,
    filled: bool,
}

impl MedianFilter {
    /// Create a new median filter with given window size.
    ///
    /// The size must be odd so the median is a real sample; a size of 1
    /// passes values through untouched.
    pub fn new(size: usize) -> Result<Self, IntakeError> {
        if size == 0 || size % 2 == 0 {
            return Err(IntakeError::InvalidFilter(format!(
                "window size must be odd and > 0, got {size}"
            )));
        }
        Ok(Self {
            window: vec![0.0; size],
            size,
            position: 0,
            filled: false,
        })
    }

    /// Pass-through filter
    pub fn identity() -> Self {
        Self {
            window: vec![0.0],
            size: 1,
            position: 0,
            filled: false,
        }
    }

    /// Add a value and get the filtered output
    pub fn filter(&mut self, value: f64) -> f64 {
        if self.size == 1 {
            return value;
        }

        self.window[self.position] = value;
        self.position = (self.position + 1) % self.size;

        if self.position == 0 {
            self.filled = true;
        }

        // Median of whatever has been seen so far while filling
        let len = if self.filled { self.size } else { self.position };
        let mut sorted = self.window[..len].to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted[len / 2]
    }

    /// Window length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reset the filter
    pub fn reset(&mut self) {
        self.window.fill(0.0);
        self.position = 0;
        self.filled = false;
    }
}
