//! Lag-window feature construction
//!
//! Turns a scalar price series into a supervised table of
//! `(lag window -> later value)` rows.

use crate::error::{ForecastError, Result};
use tracing::debug;

/// Supervised learning table built from fixed-width lag windows.
///
/// Every row holds exactly `width` features and rows keep the chronological
/// order of their window start.
#[derive(Debug, Clone, PartialEq)]
pub struct LagTable {
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
    width: usize,
}

/// Build the lag table for `prices` with windows of `nlags` values.
///
/// Row `i` uses `prices[i..i + nlags]` as features and `prices[i + nlags + 1]`
/// as target, skipping the value right after the window. A series of `N`
/// values therefore yields `N - nlags - 1` rows (zero when it is too short).
pub fn build_lag_features(prices: &[f64], nlags: usize) -> Result<LagTable> {
    if nlags == 0 {
        return Err(ForecastError::InvalidParameter(
            "Number of lags must be positive".to_string(),
        ));
    }

    let rows = prices.len().saturating_sub(nlags.saturating_add(1));
    let mut features = Vec::with_capacity(rows);
    let mut targets = Vec::with_capacity(rows);

    for i in 0..rows {
        features.push(prices[i..i + nlags].to_vec());
        targets.push(prices[i + nlags + 1]);
    }

    debug!(observations = prices.len(), nlags, rows, "built lag features");

    Ok(LagTable {
        features,
        targets,
        width: nlags,
    })
}

impl LagTable {
    /// Assemble a table from pre-built rows
    pub fn from_rows(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(ForecastError::DataError(format!(
                "Feature rows ({}) don't match targets ({})",
                features.len(),
                targets.len()
            )));
        }

        let width = features.first().map_or(0, Vec::len);
        if let Some(bad) = features.iter().position(|row| row.len() != width) {
            return Err(ForecastError::DataError(format!(
                "Row {} has {} features, expected {}",
                bad,
                features[bad].len(),
                width
            )));
        }

        Ok(Self {
            features,
            targets,
            width,
        })
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Number of features per row
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Split chronologically into `[0, at)` and `[at, len)`
    pub fn split_at(&self, at: usize) -> (LagTable, LagTable) {
        let at = at.min(self.len());
        let head = LagTable {
            features: self.features[..at].to_vec(),
            targets: self.targets[..at].to_vec(),
            width: self.width,
        };
        let tail = LagTable {
            features: self.features[at..].to_vec(),
            targets: self.targets[at..].to_vec(),
            width: self.width,
        };
        (head, tail)
    }

    /// Append one exogenous feature (e.g. a sentiment score) to every row.
    ///
    /// A column shorter than the table is padded with zeros, a longer one is
    /// truncated. An empty column leaves the table unchanged.
    pub fn with_exogenous_column(mut self, column: &[f64]) -> Self {
        if column.is_empty() {
            return self;
        }

        for (idx, row) in self.features.iter_mut().enumerate() {
            row.push(column.get(idx).copied().unwrap_or(0.0));
        }
        self.width += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_skip_value_after_window() {
        let prices: Vec<f64> = (0..8).map(f64::from).collect();
        let table = build_lag_features(&prices, 3).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.features()[0], vec![0.0, 1.0, 2.0]);
        assert_eq!(table.targets()[0], 4.0);
        assert_eq!(table.features()[3], vec![3.0, 4.0, 5.0]);
        assert_eq!(table.targets()[3], 7.0);
    }

    #[test]
    fn test_short_series_yields_empty_table() {
        let table = build_lag_features(&[1.0, 2.0, 3.0], 3).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn test_zero_lags_rejected() {
        assert!(matches!(
            build_lag_features(&[1.0, 2.0], 0),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(LagTable::from_rows(rows, vec![1.0, 2.0]).is_err());
    }
}
