//! Regression tree with variance-reduction splits
//!
//! The building block for the random forest: a binary tree grown greedily,
//! choosing at each node the (feature, threshold) pair that most reduces the
//! weighted variance of the two children.

use crate::error::{Result, StemflowError};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, sample: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

/// Single regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features considered per split; all if `None`.
    pub max_features: Option<usize>,
    pub random_state: Option<u64>,
    root: Option<TreeNode>,
    n_features: usize,
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
            root: None,
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(StemflowError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(StemflowError::TrainingError("empty training set".to_string()));
        }

        self.n_features = x.ncols();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        self.root = Some(self.build_node(x, y, &indices, 0, &mut rng));
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(StemflowError::ModelNotFitted)?;
        let predictions: Vec<f64> = x
            .outer_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();
                root.predict(&sample)
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

        let depth_reached = self.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || indices.len() < self.min_samples_split || constant_target(y, indices) {
            return TreeNode::Leaf { value: mean };
        }

        let features = self.candidate_features(rng);
        let best = features
            .iter()
            .filter_map(|&f| self.best_split_for_feature(x, y, indices, f))
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((feature, threshold, gain)) if gain > 0.0 => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature]] <= threshold);

                if left_idx.len() < self.min_samples_leaf || right_idx.len() < self.min_samples_leaf {
                    return TreeNode::Leaf { value: mean };
                }

                let left = self.build_node(x, y, &left_idx, depth + 1, rng);
                let right = self.build_node(x, y, &right_idx, depth + 1, rng);
                TreeNode::Split {
                    feature,
                    threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            _ => TreeNode::Leaf { value: mean },
        }
    }

    /// Random feature subset for one split, or all features.
    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut all: Vec<usize> = (0..self.n_features).collect();
        match self.max_features {
            Some(k) if k < self.n_features => {
                all.shuffle(rng);
                all.truncate(k.max(1));
                all
            }
            _ => all,
        }
    }

    /// Best threshold for one feature by variance reduction.
    /// Returns `(feature, threshold, gain)`.
    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        feature: usize,
    ) -> Option<(usize, f64, f64)> {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let n = sorted.len() as f64;
        let total_sum: f64 = sorted.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = sorted.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<(usize, f64, f64)> = None;

        for (pos, &idx) in sorted.iter().enumerate().take(sorted.len() - 1) {
            left_sum += y[idx];
            left_sq += y[idx] * y[idx];

            let next_idx = sorted[pos + 1];
            if (x[[idx, feature]] - x[[next_idx, feature]]).abs() < 1e-12 {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let left_sse = left_sq - left_sum * left_sum / n_left;
            let right_sse = right_sq - right_sum * right_sum / n_right;
            let gain = parent_sse - left_sse - right_sse;

            if best.as_ref().map_or(true, |(_, _, g)| gain > *g) {
                let threshold = (x[[idx, feature]] + x[[next_idx, feature]]) / 2.0;
                best = Some((feature, threshold, gain));
            }
        }

        best
    }
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

fn constant_target(y: &Array1<f64>, indices: &[usize]) -> bool {
    let first = y[indices[0]];
    indices.iter().all(|&i| (y[i] - first).abs() < 1e-12)
}
