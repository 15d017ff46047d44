//! Model training
//!
//! Three fixed regressors are supported, mirroring the experiment setup:
//! - Random forest (bagged variance-reduction trees)
//! - XGBoost-style gradient boosting (second-order, regularized leaves)
//! - CatBoost-style gradient boosting (symmetric trees)
//!
//! Hyperparameters are fixed: 100 trees/rounds, seed 42, learning rate 0.1
//! for the boosters. No cross-validation, no hyperparameter search.

mod catboost;
mod decision_tree;
mod models;
mod random_forest;
mod split;
mod xgboost;

pub use catboost::{CatBoostConfig, CatBoostRegressor};
pub use decision_tree::RegressionTree;
pub use models::{RegressionMetrics, TrainedRegressor};
pub use random_forest::RandomForest;
pub use split::train_test_split;
pub use xgboost::{XGBoostConfig, XGBoostRegressor};

use crate::error::{Result, StemflowError};
use crate::paths::ProjectPaths;
use crate::tracking::ExperimentTracker;
use ndarray::{Array1, Array2};
use std::str::FromStr;
use tracing::info;

/// Experiment name used by both training and evaluation runs.
pub const EXPERIMENT_NAME: &str = "Women-in-STEM";

/// Fraction of rows held out for testing.
pub const TEST_SIZE: f64 = 0.2;

/// Seed for the train/test split and all estimators.
pub const RANDOM_SEED: u64 = 42;

/// The three supported model kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ModelKind {
    RandomForest,
    Xgboost,
    Catboost,
}

impl ModelKind {
    /// All kinds, in training order.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::RandomForest,
        ModelKind::Xgboost,
        ModelKind::Catboost,
    ];

    /// Canonical lowercase name, used for artifact files and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "randomforest",
            ModelKind::Xgboost => "xgboost",
            ModelKind::Catboost => "catboost",
        }
    }
}

impl FromStr for ModelKind {
    type Err = StemflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "randomforest" => Ok(ModelKind::RandomForest),
            "xgboost" => Ok(ModelKind::Xgboost),
            "catboost" => Ok(ModelKind::Catboost),
            other => Err(StemflowError::UnsupportedModel(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load the persisted feature matrix and target vector.
pub fn load_processed(paths: &ProjectPaths) -> Result<(Array2<f64>, Array1<f64>)> {
    let x_json = std::fs::read_to_string(paths.features_matrix()).map_err(|_| {
        StemflowError::ArtifactNotFound(paths.features_matrix().display().to_string())
    })?;
    let y_json = std::fs::read_to_string(paths.target_vector()).map_err(|_| {
        StemflowError::ArtifactNotFound(paths.target_vector().display().to_string())
    })?;
    let x: Array2<f64> = serde_json::from_str(&x_json)?;
    let y: Array1<f64> = serde_json::from_str(&y_json)?;
    Ok((x, y))
}

/// Train one model kind on the fixed seeded split, log a tracker run, and
/// persist the fitted model. Returns the held-out metrics.
pub fn train_model(kind: ModelKind, paths: &ProjectPaths) -> Result<RegressionMetrics> {
    let (x, y) = load_processed(paths)?;
    let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, TEST_SIZE, RANDOM_SEED);

    info!(
        model = %kind,
        train_rows = x_train.nrows(),
        test_rows = x_test.nrows(),
        "Training model"
    );

    let mut model = TrainedRegressor::for_kind(kind);
    model.fit(&x_train, &y_train)?;

    let y_pred = model.predict(&x_test)?;
    let metrics = RegressionMetrics::compute(&y_test, &y_pred);

    let mut tracker = ExperimentTracker::new(paths.tracking_dir(), EXPERIMENT_NAME)?;
    let mut run = tracker.start_run(&format!("{}_run", kind));
    run.log_param("model", kind.as_str());
    run.log_metrics(&metrics.to_map());
    tracker.finish_run(run)?;

    std::fs::create_dir_all(paths.models_dir())?;
    let model_path = paths.model(kind.as_str());
    model.save(&model_path)?;

    info!(
        model = %kind,
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        path = %model_path.display(),
        "Training complete"
    );

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("randomforest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("XGBoost".parse::<ModelKind>().unwrap(), ModelKind::Xgboost);
        assert_eq!("catboost".parse::<ModelKind>().unwrap(), ModelKind::Catboost);
    }

    #[test]
    fn test_unknown_model_kind_is_invalid_argument() {
        let err = "lightgbm".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, StemflowError::UnsupportedModel(_)));
    }

    #[test]
    fn test_model_kind_round_trips_through_name() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.as_str().parse::<ModelKind>().unwrap(), kind);
        }
    }
}
