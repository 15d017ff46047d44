//! Model evaluation against the shared held-out split

use crate::error::Result;
use crate::paths::ProjectPaths;
use crate::tracking::ExperimentTracker;
use crate::training::{
    load_processed, train_test_split, ModelKind, RegressionMetrics, TrainedRegressor,
    EXPERIMENT_NAME, RANDOM_SEED, TEST_SIZE,
};
use tracing::warn;

/// Evaluate every persisted model on the identical seeded split training
/// used. A missing model file is skipped with a warning rather than
/// aborting the run. Returns the metrics for each model found.
pub fn evaluate_models(paths: &ProjectPaths) -> Result<Vec<(ModelKind, RegressionMetrics)>> {
    let (x, y) = load_processed(paths)?;
    let (_, x_test, _, y_test) = train_test_split(&x, &y, TEST_SIZE, RANDOM_SEED);

    let mut tracker = ExperimentTracker::new(paths.tracking_dir(), EXPERIMENT_NAME)?;
    let mut results = Vec::new();

    println!("{:<15} | {:<8} | {:<8} | {:<8}", "Model", "RMSE", "MAE", "R^2");
    println!("{}", "-".repeat(50));

    for kind in ModelKind::ALL {
        let model_path = paths.model(kind.as_str());
        if !model_path.exists() {
            warn!(model = %kind, path = %model_path.display(), "Model not found, skipping");
            continue;
        }

        let model = TrainedRegressor::load(&model_path)?;
        let y_pred = model.predict(&x_test)?;
        let metrics = RegressionMetrics::compute(&y_test, &y_pred);

        println!(
            "{:<15} | {:<8.3} | {:<8.3} | {:<8.3}",
            kind.as_str(),
            metrics.rmse,
            metrics.mae,
            metrics.r2
        );

        let mut run = tracker.start_run(&format!("{}_evaluation", kind));
        run.log_param("model", kind.as_str());
        run.log_metrics(&metrics.to_map());
        tracker.finish_run(run)?;

        results.push((kind, metrics));
    }

    Ok(results)
}
