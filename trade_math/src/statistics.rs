//! Summary statistics over slices of observations

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance. Returns 0.0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Running sums used to evaluate variance incrementally while sweeping
/// split thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl RunningMoments {
    /// Accumulate moments over a slice
    pub fn from_slice(values: &[f64]) -> Self {
        let mut moments = Self::default();
        for &v in values {
            moments.push(v);
        }
        moments
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Remove a previously pushed value
    pub fn remove(&mut self, value: f64) {
        self.count = self.count.saturating_sub(1);
        self.sum -= value;
        self.sum_sq -= value * value;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Sum of squared deviations from the mean (n * variance).
    ///
    /// Clamped at zero since cancellation can leave a tiny negative residue.
    pub fn sum_squared_deviation(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_sq - self.sum * self.sum / self.count as f64).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((variance(&values) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_slices() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn test_running_moments_match_direct_variance() {
        let values = [1.5, 3.0, -2.0, 8.25, 4.0];
        let mut moments = RunningMoments::from_slice(&values);
        let expected = variance(&values) * values.len() as f64;
        assert!((moments.sum_squared_deviation() - expected).abs() < 1e-9);

        moments.remove(8.25);
        let rest = [1.5, 3.0, -2.0, 4.0];
        let expected = variance(&rest) * rest.len() as f64;
        assert_eq!(moments.count(), 4);
        assert!((moments.sum_squared_deviation() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constant_values_have_zero_deviation() {
        let moments = RunningMoments::from_slice(&[100.0; 12]);
        assert_eq!(moments.sum_squared_deviation(), 0.0);
    }
}
