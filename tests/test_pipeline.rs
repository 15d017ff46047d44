//! Integration test: full task graph over a synthetic raw CSV

use std::fmt::Write as _;
use std::time::Duration;
use stemflow::paths::ProjectPaths;
use stemflow::pipeline::{build_pipeline, TaskOutcome};

/// Write a raw CSV with the original messy headers, spanning both sides of
/// the monitoring year cutoff.
fn write_raw_csv(paths: &ProjectPaths) {
    let mut csv = String::from(
        "Year,Female Enrollment (%),Gender Gap Index,Country,STEM Fields,Female Graduation Rate (%)\n",
    );

    let countries = ["Greece", "Italy", "Spain"];
    let fields = ["Engineering", "Biology"];
    for i in 0..60 {
        writeln!(
            csv,
            "{},{:.1},{:.2},{},{},{:.1}",
            2005 + (i % 12),
            35.0 + (i % 20) as f64 * 0.5,
            0.65 + (i % 10) as f64 * 0.01,
            countries[i % countries.len()],
            fields[i % fields.len()],
            30.0 + (i % 15) as f64 * 0.8
        )
        .unwrap();
    }

    let raw = paths.raw_data();
    std::fs::create_dir_all(raw.parent().unwrap()).unwrap();
    std::fs::write(raw, csv).unwrap();
}

#[test]
fn test_full_pipeline_produces_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ProjectPaths::new(dir.path());
    write_raw_csv(&paths);

    let graph = build_pipeline(&paths).with_retry_delay(Duration::from_millis(10));
    let outcomes = graph.run().unwrap();

    for (name, outcome) in &outcomes {
        assert_eq!(
            *outcome,
            TaskOutcome::Succeeded,
            "task {} did not succeed: {:?}",
            name,
            outcome
        );
    }

    // Preprocessing artifacts
    assert!(paths.features_matrix().exists());
    assert!(paths.target_vector().exists());
    assert!(paths.preprocessor().exists());

    // One persisted model per kind
    for name in ["randomforest", "xgboost", "catboost"] {
        assert!(paths.model(name).exists(), "missing model {}", name);
    }

    // Monitoring reports
    assert!(paths.reports_dir().join("data_stability.html").exists());
    assert!(paths.reports_dir().join("data_drift.html").exists());

    // Tracker store holds training and evaluation runs
    let experiment_dir = paths.tracking_dir().join("Women-in-STEM");
    assert!(experiment_dir.join("meta.json").exists());
    let run_files = std::fs::read_dir(&experiment_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("run_"))
        .count();
    // 3 training runs + 3 evaluation runs
    assert_eq!(run_files, 6);
}

#[test]
fn test_pipeline_without_raw_data_blocks_downstream() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ProjectPaths::new(dir.path());
    // No raw CSV written: preprocess fails, everything downstream is skipped

    let graph = build_pipeline(&paths).with_retry_delay(Duration::from_millis(10));
    let outcomes = graph.run().unwrap();

    assert!(matches!(outcomes["preprocess"], TaskOutcome::Failed(_)));
    for name in [
        "train_randomforest",
        "train_xgboost",
        "train_catboost",
        "evaluate_models",
        "monitoring_report",
    ] {
        assert_eq!(outcomes[name], TaskOutcome::Skipped, "task {}", name);
    }
}
