//! CatBoost-style gradient boosting with symmetric trees
//!
//! Every level of a tree applies the same (feature, threshold) split, so a
//! depth-d tree has exactly 2^d leaves indexed by the split bits. Squared
//! error loss, regularized leaf values -G / (H + lambda).

use crate::error::{Result, StemflowError};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatBoostConfig {
    pub iterations: usize,
    pub learning_rate: f64,
    pub depth: usize,
    pub reg_lambda: f64,
    pub random_state: Option<u64>,
}

impl Default for CatBoostConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            learning_rate: 0.1,
            depth: 6,
            reg_lambda: 3.0,
            random_state: Some(42),
        }
    }
}

/// Oblivious tree: one split per level, shared by every node on the level.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SymmetricTree {
    splits: Vec<(usize, f64)>,
    leaf_values: Vec<f64>,
}

impl SymmetricTree {
    fn predict(&self, sample: &[f64]) -> f64 {
        let mut idx = 0usize;
        for &(feature, threshold) in &self.splits {
            idx = idx * 2 + usize::from(sample[feature] > threshold);
        }
        self.leaf_values[idx.min(self.leaf_values.len() - 1)]
    }
}

fn build_symmetric_tree(
    x: &Array2<f64>,
    gradients: &Array1<f64>,
    hessians: &Array1<f64>,
    depth: usize,
    reg_lambda: f64,
) -> SymmetricTree {
    let n_features = x.ncols();
    let mut splits = Vec::with_capacity(depth);
    let mut buckets: Vec<Vec<usize>> = vec![(0..x.nrows()).collect()];

    for _ in 0..depth {
        // Best single split shared by every current bucket
        let best = (0..n_features)
            .into_par_iter()
            .filter_map(|feat| {
                let mut values: Vec<f64> = buckets
                    .iter()
                    .flat_map(|b| b.iter().map(|&i| x[[i, feat]]))
                    .collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                values.dedup();

                if values.len() < 2 {
                    return None;
                }

                let mut best_gain = f64::NEG_INFINITY;
                let mut best_thr = 0.0;

                // Cap the candidate thresholds for wide value ranges
                let step = (values.len() / 256).max(1);
                for i in (0..values.len() - 1).step_by(step) {
                    let thr = (values[i] + values[i + 1]) / 2.0;
                    let mut total_gain = 0.0;

                    for bucket in &buckets {
                        let (lg, lh, rg, rh) = bucket.iter().fold(
                            (0.0, 0.0, 0.0, 0.0),
                            |(lg, lh, rg, rh), &idx| {
                                if x[[idx, feat]] <= thr {
                                    (lg + gradients[idx], lh + hessians[idx], rg, rh)
                                } else {
                                    (lg, lh, rg + gradients[idx], rh + hessians[idx])
                                }
                            },
                        );
                        let parent_g = lg + rg;
                        let parent_h = lh + rh;
                        total_gain += lg * lg / (lh + reg_lambda) + rg * rg / (rh + reg_lambda)
                            - parent_g * parent_g / (parent_h + reg_lambda);
                    }

                    if total_gain > best_gain {
                        best_gain = total_gain;
                        best_thr = thr;
                    }
                }

                if best_gain > 0.0 {
                    Some((feat, best_thr, best_gain))
                } else {
                    None
                }
            })
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((feat, thr, _)) => {
                splits.push((feat, thr));
                let mut new_buckets = Vec::with_capacity(buckets.len() * 2);
                for bucket in &buckets {
                    let (left, right): (Vec<usize>, Vec<usize>) =
                        bucket.iter().partition(|&&i| x[[i, feat]] <= thr);
                    new_buckets.push(left);
                    new_buckets.push(right);
                }
                buckets = new_buckets;
            }
            None => break,
        }
    }

    let leaf_values: Vec<f64> = buckets
        .iter()
        .map(|bucket| {
            if bucket.is_empty() {
                return 0.0;
            }
            let g: f64 = bucket.iter().map(|&i| gradients[i]).sum();
            let h: f64 = bucket.iter().map(|&i| hessians[i]).sum();
            -g / (h + reg_lambda)
        })
        .collect();

    SymmetricTree { splits, leaf_values }
}

/// CatBoost-style regressor (squared error loss).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatBoostRegressor {
    config: CatBoostConfig,
    trees: Vec<SymmetricTree>,
    base_score: f64,
}

impl CatBoostRegressor {
    pub fn new(config: CatBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(StemflowError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(StemflowError::TrainingError("empty training set".to_string()));
        }

        self.base_score = y.mean().unwrap_or(0.0);
        let mut preds = Array1::from_elem(n_samples, self.base_score);
        let hessians = Array1::from_elem(n_samples, 1.0);

        self.trees.clear();
        for _ in 0..self.config.iterations {
            let gradients: Array1<f64> = &preds - y;

            let tree =
                build_symmetric_tree(x, &gradients, &hessians, self.config.depth, self.config.reg_lambda);

            for i in 0..n_samples {
                let row = x.row(i);
                let sample: Vec<f64> = row.iter().copied().collect();
                preds[i] += self.config.learning_rate * tree.predict(&sample);
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(StemflowError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut preds = Array1::from_elem(n, self.base_score);
        for i in 0..n {
            let row = x.row(i);
            let sample: Vec<f64> = row.iter().copied().collect();
            for tree in &self.trees {
                preds[i] += self.config.learning_rate * tree.predict(&sample);
            }
        }
        Ok(preds)
    }

    pub fn n_iterations(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fits_linear_data() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0, 24.0];

        let mut model = CatBoostRegressor::new(CatBoostConfig {
            iterations: 80,
            depth: 3,
            ..CatBoostConfig::default()
        });
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_iterations(), 80);

        let preds = model.predict(&x).unwrap();
        let mse: f64 = preds
            .iter()
            .zip(y.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 4.0, "MSE too high: {}", mse);
    }

    #[test]
    fn test_constant_target_stops_splitting() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![5.0, 5.0, 5.0, 5.0];

        let mut model = CatBoostRegressor::new(CatBoostConfig::default());
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        for p in preds.iter() {
            assert!((p - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = CatBoostRegressor::new(CatBoostConfig::default());
        let x = array![[1.0]];
        assert!(model.predict(&x).is_err());
    }
}
