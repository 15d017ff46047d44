//! Integration test: load → clean → encode

use polars::prelude::*;
use stemflow::data::clean_column_names;
use stemflow::preprocessing::Preprocessor;

/// 100-row synthetic dataset with the raw (uncleaned) column names.
fn raw_dataset() -> DataFrame {
    let n = 100;
    let countries = ["Greece", "Italy", "Spain", "France"];
    let fields = ["Engineering", "Biology", "Physics"];

    let mut year = Vec::with_capacity(n);
    let mut enrollment = Vec::with_capacity(n);
    let mut gap = Vec::with_capacity(n);
    let mut country = Vec::with_capacity(n);
    let mut field = Vec::with_capacity(n);
    let mut rate = Vec::with_capacity(n);

    for i in 0..n {
        year.push(2005 + (i % 12) as i64);
        enrollment.push(35.0 + (i % 20) as f64 * 0.5);
        gap.push(0.65 + (i % 10) as f64 * 0.01);
        country.push(countries[i % countries.len()]);
        field.push(fields[i % fields.len()]);
        rate.push(30.0 + (i % 15) as f64 * 0.8);
    }

    df!(
        "Year" => &year,
        "Female Enrollment (%)" => &enrollment,
        "Gender Gap Index" => &gap,
        "Country" => &country,
        "STEM Fields" => &field,
        "Female Graduation Rate (%)" => &rate
    )
    .unwrap()
}

#[test]
fn test_clean_then_encode_preserves_rows() {
    let df = clean_column_names(&raw_dataset()).unwrap();

    let mut preprocessor = Preprocessor::new();
    let (x, y) = preprocessor.fit_transform(&df).unwrap();

    assert_eq!(x.nrows(), 100);
    assert_eq!(y.len(), 100);
    assert!(x.ncols() > 0);
}

#[test]
fn test_encoded_width_matches_vocabularies() {
    let df = clean_column_names(&raw_dataset()).unwrap();

    let mut preprocessor = Preprocessor::new();
    let (x, _) = preprocessor.fit_transform(&df).unwrap();

    // 3 numeric + 4 countries + 3 fields
    assert_eq!(x.ncols(), 10);
    assert_eq!(preprocessor.feature_names().len(), 10);
}

#[test]
fn test_transform_of_unseen_levels_stays_aligned() {
    let df = clean_column_names(&raw_dataset()).unwrap();

    let mut preprocessor = Preprocessor::new();
    preprocessor.fit(&df).unwrap();

    let unseen = df!(
        "year" => &[2020i64, 2021],
        "female_enrollment" => &[50.0, 51.0],
        "gender_gap_index" => &[0.8, 0.81],
        "country" => &["Wakanda", "Greece"],
        "stem_fields" => &["Robotics", "Biology"]
    )
    .unwrap();

    let x = preprocessor.transform(&unseen).unwrap();
    assert_eq!(x.nrows(), 2);
    assert_eq!(x.ncols(), 10);

    // Unseen country encodes as all zeros in the country block (cols 3..7)
    for j in 3..7 {
        assert_eq!(x[[0, j]], 0.0);
    }
    // Known country still gets its indicator
    assert_eq!(x.row(1).iter().skip(3).take(4).sum::<f64>(), 1.0);
}

#[test]
fn test_all_outputs_finite_for_complete_input() {
    let df = clean_column_names(&raw_dataset()).unwrap();

    let mut preprocessor = Preprocessor::new();
    let (x, y) = preprocessor.fit_transform(&df).unwrap();

    assert!(x.iter().all(|v| v.is_finite()));
    assert!(y.iter().all(|v| v.is_finite()));
}
