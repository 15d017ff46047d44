//! Column-wise preprocessing pipeline for the fixed dataset schema

use super::{OneHotEncoder, StandardScaler, CATEGORICAL_FEATURES, NUMERIC_FEATURES, TARGET};
use crate::error::{Result, StemflowError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Composite transformer: standard-scales the three numeric features and
/// one-hot encodes the two categorical features, producing a dense matrix.
///
/// Fitted once during preprocessing, then shared read-only by training,
/// evaluation, and serving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preprocessor {
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit scaler and encoder on the feature columns of a cleaned frame.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        for col in NUMERIC_FEATURES.iter().chain(CATEGORICAL_FEATURES.iter()) {
            if df.column(col).is_err() {
                return Err(StemflowError::ColumnNotFound(col.to_string()));
            }
        }

        self.scaler.fit(df, &NUMERIC_FEATURES)?;
        self.encoder.fit(df, &CATEGORICAL_FEATURES)?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the feature columns into a dense matrix.
    ///
    /// Column layout: scaled numerics in [`NUMERIC_FEATURES`] order, then
    /// indicator blocks per categorical column in [`CATEGORICAL_FEATURES`]
    /// order. Row count always equals the input row count.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(StemflowError::ModelNotFitted);
        }

        let n_rows = df.height();

        let mut numeric_cols: Vec<Vec<f64>> = Vec::with_capacity(NUMERIC_FEATURES.len());
        for col in NUMERIC_FEATURES {
            numeric_cols.push(self.scaler.transform_column(df, col)?);
        }

        let mut indicator_blocks: Vec<Vec<Vec<f64>>> =
            Vec::with_capacity(CATEGORICAL_FEATURES.len());
        for col in CATEGORICAL_FEATURES {
            indicator_blocks.push(self.encoder.transform_column(df, col)?);
        }

        let n_cols = self.n_output_features();
        let mut matrix = Array2::zeros((n_rows, n_cols));
        for row in 0..n_rows {
            let mut j = 0;
            for col_values in &numeric_cols {
                matrix[[row, j]] = col_values[row];
                j += 1;
            }
            for block in &indicator_blocks {
                for &v in &block[row] {
                    matrix[[row, j]] = v;
                    j += 1;
                }
            }
        }

        Ok(matrix)
    }

    /// Extract the target column as a vector.
    pub fn target(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let column = df
            .column(TARGET)
            .map_err(|_| StemflowError::ColumnNotFound(TARGET.to_string()))?;
        let casted = column
            .cast(&DataType::Float64)
            .map_err(|e| StemflowError::DataError(e.to_string()))?;
        let values: Vec<f64> = casted
            .as_materialized_series()
            .f64()
            .map_err(|e| StemflowError::DataError(e.to_string()))?
            .into_iter()
            .map(|opt| opt.unwrap_or(f64::NAN))
            .collect();
        Ok(Array1::from_vec(values))
    }

    /// Fit, then transform features and extract the target in one step.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>)> {
        self.fit(df)?;
        let x = self.transform(df)?;
        let y = self.target(df)?;
        Ok((x, y))
    }

    /// Number of output matrix columns.
    pub fn n_output_features(&self) -> usize {
        let n_indicators: usize = CATEGORICAL_FEATURES
            .iter()
            .map(|col| self.encoder.vocabulary(col).map_or(0, |v| v.len()))
            .sum();
        NUMERIC_FEATURES.len() + n_indicators
    }

    /// Output column names, matching the matrix layout.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        for col in CATEGORICAL_FEATURES {
            names.extend(self.encoder.indicator_names(col));
        }
        names
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Persist the fitted pipeline as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted pipeline from JSON.
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

    fn sample_df() -> DataFrame {
        df!(
            "year" => &[2010i64, 2011, 2012, 2013],
            "female_enrollment" => &[38.0, 40.5, 43.0, 45.5],
            "gender_gap_index" => &[0.68, 0.70, 0.71, 0.73],
            "country" => &["Greece", "Italy", "Greece", "Spain"],
            "stem_fields" => &["Engineering", "Biology", "Engineering", "Physics"],
            "female_graduation_rate" => &[31.0, 35.0, 36.5, 39.0]
        )
        .unwrap()
    }

    #[test]
    fn test_output_shape() {
        let df = sample_df();
        let mut pre = Preprocessor::new();
        let (x, y) = pre.fit_transform(&df).unwrap();

        assert_eq!(x.nrows(), 4);
        // 3 numerics + 3 countries + 3 fields
        assert_eq!(x.ncols(), 9);
        assert_eq!(y.len(), 4);
        assert_eq!(pre.n_output_features(), 9);
    }

    #[test]
    fn test_feature_names_match_layout() {
        let df = sample_df();
        let mut pre = Preprocessor::new();
        pre.fit(&df).unwrap();

        let names = pre.feature_names();
        assert_eq!(names.len(), pre.n_output_features());
        assert_eq!(names[0], "year");
        assert_eq!(names[3], "country_Greece");
        assert!(names.iter().any(|n| n == "stem_fields_Physics"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let df = df!("year" => &[2010i64]).unwrap();
        let mut pre = Preprocessor::new();
        assert!(pre.fit(&df).is_err());
    }

    #[test]
    fn test_unknown_category_transforms_to_zeros() {
        let df = sample_df();
        let mut pre = Preprocessor::new();
        pre.fit(&df).unwrap();

        let unseen = df!(
            "year" => &[2014i64],
            "female_enrollment" => &[47.0],
            "gender_gap_index" => &[0.74],
            "country" => &["Atlantis"],
            "stem_fields" => &["Alchemy"]
        )
        .unwrap();

        let x = pre.transform(&unseen).unwrap();
        assert_eq!(x.nrows(), 1);
        // All six indicator slots are zero for unseen levels
        for j in 3..x.ncols() {
            assert_eq!(x[[0, j]], 0.0);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let df = sample_df();
        let mut pre = Preprocessor::new();
        pre.fit(&df).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprocessor.json");
        pre.save(&path).unwrap();

        let loaded = Preprocessor::load(&path).unwrap();
        assert!(loaded.is_fitted());
        assert_eq!(loaded.feature_names(), pre.feature_names());

        let a = pre.transform(&df).unwrap();
        let b = loaded.transform(&df).unwrap();
        assert_eq!(a, b);
    }
}
