//! Regression metrics and the trained-model wrapper

use super::{CatBoostConfig, CatBoostRegressor, ModelKind, RandomForest, XGBoostConfig, XGBoostRegressor};
use super::RANDOM_SEED;
use crate::error::{Result, StemflowError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Held-out regression metrics for one model run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Compute RMSE, MAE, and R² from aligned prediction/target vectors.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean: f64 = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            rmse: mse.sqrt(),
            mae,
            r2,
        }
    }

    /// Map form with exactly the keys `rmse`, `mae`, `r2`.
    pub fn to_map(&self) -> HashMap<String, f64> {
        HashMap::from([
            ("rmse".to_string(), self.rmse),
            ("mae".to_string(), self.mae),
            ("r2".to_string(), self.r2),
        ])
    }
}

/// A fitted (or fittable) regressor of one of the three supported kinds.
///
/// Persisted as tagged JSON so the file itself records which estimator it
/// holds; evaluation and serving reload through [`TrainedRegressor::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TrainedRegressor {
    RandomForest(RandomForest),
    Xgboost(XGBoostRegressor),
    Catboost(CatBoostRegressor),
}

impl TrainedRegressor {
    /// Construct an unfitted estimator with the experiment's fixed
    /// hyperparameters: 100 trees/rounds, seed 42, learning rate 0.1 for
    /// the boosters.
    pub fn for_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::RandomForest => {
                TrainedRegressor::RandomForest(RandomForest::new(100).with_random_state(RANDOM_SEED))
            }
            ModelKind::Xgboost => TrainedRegressor::Xgboost(XGBoostRegressor::new(XGBoostConfig {
                n_estimators: 100,
                learning_rate: 0.1,
                random_state: Some(RANDOM_SEED),
                ..XGBoostConfig::default()
            })),
            ModelKind::Catboost => TrainedRegressor::Catboost(CatBoostRegressor::new(CatBoostConfig {
                iterations: 100,
                learning_rate: 0.1,
                depth: 6,
                random_state: Some(RANDOM_SEED),
                ..CatBoostConfig::default()
            })),
        }
    }

    /// Which kind this wrapper holds.
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedRegressor::RandomForest(_) => ModelKind::RandomForest,
            TrainedRegressor::Xgboost(_) => ModelKind::Xgboost,
            TrainedRegressor::Catboost(_) => ModelKind::Catboost,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            TrainedRegressor::RandomForest(m) => m.fit(x, y),
            TrainedRegressor::Xgboost(m) => m.fit(x, y),
            TrainedRegressor::Catboost(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedRegressor::RandomForest(m) => m.predict(x),
            TrainedRegressor::Xgboost(m) => m.predict(x),
            TrainedRegressor::Catboost(m) => m.predict(x),
        }
    }

    /// Persist as tagged JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved model.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|_| {
            StemflowError::ArtifactNotFound(path.display().to_string())
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_metrics_keys() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred);
        let map = metrics.to_map();

        assert_eq!(map.len(), 3);
        for key in ["rmse", "mae", "r2"] {
            assert!(map[key].is_finite(), "{} should be finite", key);
        }
        assert!(metrics.r2 > 0.9);
    }

    #[test]
    fn test_perfect_prediction() {
        let y = array![1.0, 2.0, 3.0];
        let metrics = RegressionMetrics::compute(&y, &y);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_factory_returns_matching_estimator() {
        assert!(matches!(
            TrainedRegressor::for_kind(ModelKind::RandomForest),
            TrainedRegressor::RandomForest(_)
        ));
        assert!(matches!(
            TrainedRegressor::for_kind(ModelKind::Xgboost),
            TrainedRegressor::Xgboost(_)
        ));
        assert!(matches!(
            TrainedRegressor::for_kind(ModelKind::Catboost),
            TrainedRegressor::Catboost(_)
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0, 12.0];

        let mut model = TrainedRegressor::for_kind(ModelKind::Xgboost);
        model.fit(&x, &y).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xgboost.json");
        model.save(&path).unwrap();

        let loaded = TrainedRegressor::load(&path).unwrap();
        assert_eq!(loaded.kind(), ModelKind::Xgboost);
        assert_eq!(
            model.predict(&x).unwrap(),
            loaded.predict(&x).unwrap()
        );
    }
}
