//! Random Forest regressor

use super::decision_tree::{RegressionTree, TreeConfig};
use crate::error::{ForecastError, Result};
use crate::models::{validate_training_set, Regressor};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (all features if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model.
///
/// Trees are grown one after another on the calling thread, each from its
/// own seeded stream, so two fits on the same data are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        let n_features = validate_training_set(features, targets)?;
        if self.config.n_trees == 0 {
            return Err(ForecastError::InvalidParameter(
                "A forest needs at least one tree".to_string(),
            ));
        }

        let n_samples = targets.len();
        let all_indices: Vec<usize> = (0..n_samples).collect();
        let mut trees = Vec::with_capacity(self.config.n_trees);

        for i in 0..self.config.n_trees {
            let tree_seed = self.config.seed.wrapping_add(i as u64);
            let mut tree = RegressionTree::new(TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: self.config.max_features,
                seed: tree_seed,
            });

            if self.config.bootstrap {
                let sample = Self::bootstrap_indices(n_samples, tree_seed);
                tree.fit_indices(features, targets, &sample)?;
            } else {
                tree.fit_indices(features, targets, &all_indices)?;
            }

            trees.push(tree);
        }

        debug!(
            trees = trees.len(),
            samples = n_samples,
            features = n_features,
            "random forest fitted"
        );

        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    /// Average of the per-tree predictions
    fn predict_one(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>() / self.trees.len() as f64
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "Random Forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 10,
            max_depth: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_random_forest_regression() {
        let features: Vec<Vec<f64>> = (0..200)
            .map(|i| vec![i as f64 / 20.0, (i as f64 / 10.0).sin()])
            .collect();
        let targets: Vec<f64> = features.iter().map(|f| f[0] + 2.0 * f[1]).collect();

        let mut forest = RandomForest::new(small_config());
        forest.fit(&features, &targets).unwrap();

        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.n_features(), 2);

        let mse = features
            .iter()
            .zip(&targets)
            .map(|(f, t)| (forest.predict_one(f) - t).powi(2))
            .sum::<f64>()
            / targets.len() as f64;
        assert!(mse < 0.5, "in-sample mse too high: {}", mse);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let features: Vec<Vec<f64>> = (0..60).map(|i| vec![(i as f64).cos(), i as f64]).collect();
        let targets: Vec<f64> = (0..60).map(|i| (i as f64 * 0.3).sin()).collect();

        let mut first = RandomForest::new(small_config());
        let mut second = RandomForest::new(small_config());
        first.fit(&features, &targets).unwrap();
        second.fit(&features, &targets).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_trees_rejected() {
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 0,
            ..Default::default()
        });
        assert!(forest.fit(&[vec![1.0]], &[1.0]).is_err());
    }
}
