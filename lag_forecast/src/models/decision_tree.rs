//! CART regression tree

use crate::error::{ForecastError, Result};
use crate::models::{validate_training_set, Regressor};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use trade_math::statistics::{mean, variance, RunningMoments};

/// Node impurity below which a node is treated as pure
const PURE_NODE_VARIANCE: f64 = 1e-12;

/// Decision tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (the root sits at depth 0)
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    weighted_deviation: f64,
}

/// Regression tree minimizing within-node squared error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    n_features: usize,
}

impl RegressionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Train on the rows selected by `indices`.
    ///
    /// Indices may repeat, which is how bootstrap samples are passed in.
    pub fn fit_indices(
        &mut self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
    ) -> Result<()> {
        self.n_features = validate_training_set(features, targets)?;
        if indices.is_empty() {
            return Err(ForecastError::DegenerateInput(
                "Cannot grow a tree on zero samples".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= targets.len()) {
            return Err(ForecastError::ModelError(format!(
                "Sample index {} out of range",
                bad
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_tree(features, targets, indices.to_vec(), 0, &mut rng));
        Ok(())
    }

    /// Build tree recursively
    fn build_tree(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let labels: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
        let n = labels.len();

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || variance(&labels) <= PURE_NODE_VARIANCE
        {
            return Self::leaf(&labels);
        }

        let split = match self.find_best_split(features, targets, &indices, rng) {
            Some(split) => split,
            None => return Self::leaf(&labels),
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| features[i][split.feature] <= split.threshold);

        let left = self.build_tree(features, targets, left_idx, depth + 1, rng);
        let right = self.build_tree(features, targets, right_idx, depth + 1, rng);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn leaf(labels: &[f64]) -> TreeNode {
        TreeNode::Leaf {
            value: mean(labels),
            n_samples: labels.len(),
        }
    }

    /// Sweep every candidate feature in sorted order, keeping running moments
    /// on both sides of the threshold.
    fn find_best_split(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let max_features = self
            .config
            .max_features
            .unwrap_or(self.n_features)
            .clamp(1, self.n_features.max(1));

        let mut feature_order: Vec<usize> = (0..self.n_features).collect();
        feature_order.shuffle(rng);
        feature_order.truncate(max_features);

        let labels: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
        let parent = RunningMoments::from_slice(&labels);
        let parent_deviation = parent.sum_squared_deviation();

        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for &feature in &feature_order {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (features[i][feature], targets[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = RunningMoments::default();
            let mut right = parent;

            for k in 0..n.saturating_sub(1) {
                let (x, y) = pairs[k];
                left.push(y);
                right.remove(y);

                let next_x = pairs[k + 1].0;
                if x >= next_x {
                    continue;
                }
                if left.count() < min_leaf || right.count() < min_leaf {
                    continue;
                }

                let weighted = left.sum_squared_deviation() + right.sum_squared_deviation();
                let improves_parent = weighted < parent_deviation;
                let beats_best = best
                    .as_ref()
                    .map_or(true, |b| weighted < b.weighted_deviation);

                if improves_parent && beats_best {
                    let mut threshold = (x + next_x) / 2.0;
                    if threshold >= next_x {
                        threshold = x;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        weighted_deviation: weighted,
                    });
                }
            }
        }

        best
    }

    fn traverse(node: &TreeNode, row: &[f64]) -> f64 {
        let mut node = node;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

impl Regressor for RegressionTree {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        let indices: Vec<usize> = (0..targets.len()).collect();
        self.fit_indices(features, targets, &indices)
    }

    fn predict_one(&self, row: &[f64]) -> f64 {
        match &self.root {
            Some(node) => Self::traverse(node, row),
            None => 0.0,
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "Regression Tree"
    }
}
