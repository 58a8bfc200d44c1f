//! Window Statistics

use serde::{Deserialize, Serialize};

/// Summary of the calibration window at the last recalibration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub avg: f64,
    /// Number of samples summarised
    pub count: usize,
}

impl WindowStats {
    /// Compute statistics over a sequence of values
    pub fn compute<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let mut stats = Self {
            min: f64::MAX,
            max: f64::MIN,
            ..Self::default()
        };

        for &value in values {
            stats.count += 1;
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);
            // Running mean, never materialises the sum
            stats.avg += (value - stats.avg) / stats.count as f64;
        }

        if stats.count == 0 {
            return Self::default();
        }
        stats
    }

    /// Spread between the most-open and most-closed samples
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_avg() {
        let values = vec![0.1, 0.3, 0.2, 0.4];
        let stats = WindowStats::compute(&values);
        assert!((stats.min - 0.1).abs() < 1e-12);
        assert!((stats.max - 0.4).abs() < 1e-12);
        assert!((stats.avg - 0.25).abs() < 1e-12);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_mean_of_huge_values_stays_finite() {
        let values = vec![f64::MAX / 2.0; 300];
        let stats = WindowStats::compute(&values);
        assert_eq!(stats.avg, f64::MAX / 2.0);
        assert_eq!(stats.range(), 0.0);
    }

    #[test]
    fn test_empty_values() {
        let values: Vec<f64> = vec![];
        let stats = WindowStats::compute(&values);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.range(), 0.0);
    }
}
