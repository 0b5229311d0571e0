//! Regression models fitted on lag tables

use crate::error::{ForecastError, Result};
use crate::features::LagTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

pub mod decision_tree;
pub mod random_forest;

use random_forest::{ForestConfig, RandomForest};

/// Common interface for regressors trained on feature rows
pub trait Regressor: fmt::Debug {
    /// Fit on rows of equal width and their targets
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict a single row
    fn predict_one(&self, row: &[f64]) -> f64;

    /// Predict several rows
    fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Width of the rows the regressor was fitted on
    fn n_features(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Check a training set and return its row width
pub(crate) fn validate_training_set(features: &[Vec<f64>], targets: &[f64]) -> Result<usize> {
    if features.is_empty() {
        return Err(ForecastError::DegenerateInput(
            "Training set is empty".to_string(),
        ));
    }
    if features.len() != targets.len() {
        return Err(ForecastError::ModelError(format!(
            "Feature rows ({}) don't match targets ({})",
            features.len(),
            targets.len()
        )));
    }

    let width = features[0].len();
    if width == 0 {
        return Err(ForecastError::DegenerateInput(
            "Feature rows have no columns".to_string(),
        ));
    }
    if features.iter().any(|row| row.len() != width) {
        return Err(ForecastError::ModelError(
            "Feature rows have different widths".to_string(),
        ));
    }
    if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
        return Err(ForecastError::DegenerateInput(
            "Training set contains non-finite values".to_string(),
        ));
    }

    Ok(width)
}

/// Model families a caller can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    RandomForest,
    Arima,
    Lstm,
}

impl ModelFamily {
    /// Family used whenever the requested one cannot be trained
    pub const DEFAULT: ModelFamily = ModelFamily::RandomForest;

    /// Whether this crate can train the family itself
    pub fn is_implemented(self) -> bool {
        matches!(self, ModelFamily::RandomForest)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "rf",
            ModelFamily::Arima => "arima",
            ModelFamily::Lstm => "lstm",
        }
    }

    /// Resolve a family token, falling back to the default family.
    ///
    /// Unknown tokens and known-but-unimplemented families both resolve to
    /// [`ModelFamily::DEFAULT`]; the fallback is logged and flagged on the
    /// selection, never returned as an error.
    pub fn select(token: &str) -> FamilySelection {
        match token.parse::<ModelFamily>() {
            Ok(family) if family.is_implemented() => FamilySelection {
                requested: token.to_string(),
                resolved: family,
                fallback: false,
            },
            Ok(family) => {
                warn!(
                    requested = family.as_str(),
                    resolved = Self::DEFAULT.as_str(),
                    "model family not implemented, falling back"
                );
                FamilySelection {
                    requested: token.to_string(),
                    resolved: Self::DEFAULT,
                    fallback: true,
                }
            }
            Err(_) => {
                warn!(
                    requested = token,
                    resolved = Self::DEFAULT.as_str(),
                    "unknown model family, falling back"
                );
                FamilySelection {
                    requested: token.to_string(),
                    resolved: Self::DEFAULT,
                    fallback: true,
                }
            }
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rf" | "randomforest" | "random_forest" => Ok(ModelFamily::RandomForest),
            "arima" => Ok(ModelFamily::Arima),
            "lstm" => Ok(ModelFamily::Lstm),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown model family: {}",
                other
            ))),
        }
    }
}

/// Outcome of resolving a requested family token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySelection {
    /// Token as the caller supplied it
    pub requested: String,
    /// Family that is actually trained
    pub resolved: ModelFamily,
    /// True when `resolved` differs from what was asked for
    pub fallback: bool,
}

/// Concrete estimators behind a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    RandomForest(RandomForest),
}

impl Estimator {
    fn regressor(&self) -> &dyn Regressor {
        match self {
            Estimator::RandomForest(forest) => forest,
        }
    }
}

/// A fitted model. Read-only once returned by [`train_model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    selection: FamilySelection,
    estimator: Estimator,
}

impl TrainedModel {
    /// Family the estimator belongs to
    pub fn family(&self) -> ModelFamily {
        self.selection.resolved
    }

    pub fn selection(&self) -> &FamilySelection {
        &self.selection
    }

    /// Whether the requested family was substituted
    pub fn used_fallback(&self) -> bool {
        self.selection.fallback
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Same estimator, reported under another selection of the same family
    pub(crate) fn reselected(mut self, selection: &FamilySelection) -> Self {
        if selection.resolved == self.selection.resolved {
            self.selection = selection.clone();
        }
        self
    }

    /// Width of the rows the model expects
    pub fn n_features(&self) -> usize {
        self.estimator.regressor().n_features()
    }

    pub fn name(&self) -> &str {
        self.estimator.regressor().name()
    }

    /// Predict one row, checking its width and the finiteness of the output
    pub fn predict_one(&self, row: &[f64]) -> Result<f64> {
        let expected = self.n_features();
        if row.len() != expected {
            return Err(ForecastError::ModelError(format!(
                "Row has {} features, model expects {}",
                row.len(),
                expected
            )));
        }

        let prediction = self.estimator.regressor().predict_one(row);
        if !prediction.is_finite() {
            return Err(ForecastError::ModelError(format!(
                "Model produced a non-finite prediction: {}",
                prediction
            )));
        }
        Ok(prediction)
    }

    /// Predict several rows
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }
}

/// Hyperparameters of the forest every family currently trains
pub fn default_forest_config() -> ForestConfig {
    ForestConfig::default()
}

/// Fit a model of the selected family on a lag table
pub fn train_model(table: &LagTable, selection: &FamilySelection) -> Result<TrainedModel> {
    let estimator = match selection.resolved {
        // every family trains the forest until it has its own estimator
        ModelFamily::RandomForest | ModelFamily::Arima | ModelFamily::Lstm => {
            let mut forest = RandomForest::new(default_forest_config());
            forest.fit(table.features(), table.targets())?;
            Estimator::RandomForest(forest)
        }
    };

    info!(
        family = selection.resolved.as_str(),
        fallback = selection.fallback,
        rows = table.len(),
        width = table.width(),
        "model trained"
    );

    Ok(TrainedModel {
        selection: selection.clone(),
        estimator,
    })
}
