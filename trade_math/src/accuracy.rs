//! Regression error metrics for scoring predictions against actual values
//!
//! All functions take `(predicted, actual)` slices of equal, non-zero length.

use crate::{MathError, Result};

/// Direction accuracy reported when there are fewer than two observations
/// and no consecutive move can be compared.
pub const UNDEFINED_DIRECTION_ACCURACY: f64 = 0.5;

fn check_lengths(predicted: &[f64], actual: &[f64]) -> Result<()> {
    if predicted.len() != actual.len() {
        return Err(MathError::InvalidInput(format!(
            "Predicted length ({}) doesn't match actual length ({})",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.is_empty() {
        return Err(MathError::InsufficientData(
            "At least one observation is required".to_string(),
        ));
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(predicted, actual)?;

    let sum: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).abs())
        .sum();

    Ok(sum / predicted.len() as f64)
}

/// Mean squared error
pub fn mean_squared_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(predicted, actual)?;

    let sum: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();

    Ok(sum / predicted.len() as f64)
}

/// Root mean squared error
pub fn root_mean_squared_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    Ok(mean_squared_error(predicted, actual)?.sqrt())
}

/// Fraction of consecutive moves whose direction agrees.
///
/// A move counts as "up" when the consecutive difference is strictly
/// positive, so flat and falling moves share the same label. With fewer than
/// two observations the result is [`UNDEFINED_DIRECTION_ACCURACY`].
pub fn direction_accuracy(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    if predicted.len() != actual.len() {
        return Err(MathError::InvalidInput(format!(
            "Predicted length ({}) doesn't match actual length ({})",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.len() < 2 {
        return Ok(UNDEFINED_DIRECTION_ACCURACY);
    }

    let agreements = predicted
        .windows(2)
        .zip(actual.windows(2))
        .filter(|(p, a)| (p[1] - p[0] > 0.0) == (a[1] - a[0] > 0.0))
        .count();

    Ok(agreements as f64 / (predicted.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_metrics() {
        let actual = [10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = [12.0, 18.0, 33.0, 37.0, 52.0];

        let mae = mean_absolute_error(&predicted, &actual).unwrap();
        assert!((mae - 2.4).abs() < 1e-12);

        let mse = mean_squared_error(&predicted, &actual).unwrap();
        assert!((mse - 6.0).abs() < 1e-12);

        let rmse = root_mean_squared_error(&predicted, &actual).unwrap();
        assert!((rmse - 6.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_length_validation() {
        assert!(matches!(
            mean_absolute_error(&[1.0, 2.0], &[1.0]),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            root_mean_squared_error(&[], &[]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(direction_accuracy(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_direction_accuracy_counts_agreements() {
        // moves: predicted up, down, up; actual up, up, up
        let predicted = [1.0, 2.0, 1.5, 3.0];
        let actual = [1.0, 2.0, 3.0, 4.0];
        let score = direction_accuracy(&predicted, &actual).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_flat_moves_count_as_not_up() {
        let predicted = [5.0, 5.0, 5.0];
        let actual = [5.0, 4.0, 3.0];
        assert_eq!(direction_accuracy(&predicted, &actual).unwrap(), 1.0);
    }

    #[test]
    fn test_direction_accuracy_undefined_for_short_series() {
        assert_eq!(
            direction_accuracy(&[], &[]).unwrap(),
            UNDEFINED_DIRECTION_ACCURACY
        );
        assert_eq!(
            direction_accuracy(&[3.0], &[4.0]).unwrap(),
            UNDEFINED_DIRECTION_ACCURACY
        );
    }
}
