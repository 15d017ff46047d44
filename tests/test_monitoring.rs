//! Integration test: monitoring report generation

use polars::prelude::*;
use stemflow::monitoring::generate_reports;

fn dataset_with_constant_current() -> DataFrame {
    // Reference period varies; every current-period row is identical
    let mut year = Vec::new();
    let mut enrollment = Vec::new();
    let mut gap = Vec::new();
    let mut country = Vec::new();
    let mut rate = Vec::new();

    for i in 0..20 {
        year.push(2005 + (i % 7) as i64);
        enrollment.push(35.0 + i as f64 * 0.5);
        gap.push(0.65 + (i % 5) as f64 * 0.01);
        country.push(if i % 2 == 0 { "Greece" } else { "Italy" });
        rate.push(30.0 + i as f64 * 0.3);
    }
    for _ in 0..10 {
        year.push(2014);
        enrollment.push(42.0);
        gap.push(0.7);
        country.push("Greece");
        rate.push(37.0);
    }

    df!(
        "year" => &year,
        "female_enrollment" => &enrollment,
        "gender_gap_index" => &gap,
        "country" => &country,
        "female_graduation_rate" => &rate
    )
    .unwrap()
}

#[test]
fn test_constant_current_period_completes_and_writes_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("monitoring").join("reports");

    let df = dataset_with_constant_current();
    let (stability_path, drift_path) = generate_reports(&df, out_dir.clone()).unwrap();

    assert!(stability_path.exists());
    assert!(drift_path.exists());
    assert_eq!(stability_path, out_dir.join("data_stability.html"));
    assert_eq!(drift_path, out_dir.join("data_drift.html"));

    let stability_html = std::fs::read_to_string(&stability_path).unwrap();
    assert!(stability_html.contains("Data Stability"));
    let drift_html = std::fs::read_to_string(&drift_path).unwrap();
    assert!(drift_html.contains("Data Drift"));
}

#[test]
fn test_reports_dir_is_created_if_absent() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b").join("reports");
    assert!(!nested.exists());

    let df = dataset_with_constant_current();
    generate_reports(&df, nested.clone()).unwrap();
    assert!(nested.exists());
}

#[test]
fn test_shifted_current_period_flags_drift() {
    let mut year = Vec::new();
    let mut value = Vec::new();
    for i in 0..30 {
        year.push(2005 + (i % 6) as i64);
        value.push(10.0 + (i % 10) as f64 * 0.1);
    }
    for i in 0..30 {
        year.push(2013 + (i % 3) as i64);
        value.push(500.0 + i as f64);
    }
    let df = df!("year" => &year, "metric" => &value).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (_, drift_path) = generate_reports(&df, dir.path().to_path_buf()).unwrap();

    let drift_html = std::fs::read_to_string(&drift_path).unwrap();
    assert!(drift_html.contains("DRIFT"));
}
