//! Standard (z-score) scaling for numeric columns

use crate::error::{Result, StemflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-column parameters captured at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScaleParams {
    mean: f64,
    std: f64,
}

/// Standard scaler: `(x - mean) / std` per column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScaleParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture mean and standard deviation for each named column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let ca = numeric_column(df, col_name)?;
            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ScaleParams {
                    mean,
                    // Constant columns scale by 1 instead of dividing by zero
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale one column of `df` into a plain vector, NaN for nulls.
    pub fn transform_column(&self, df: &DataFrame, col_name: &str) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(StemflowError::ModelNotFitted);
        }
        let params = self
            .params
            .get(col_name)
            .ok_or_else(|| StemflowError::ColumnNotFound(col_name.to_string()))?;

        let ca = numeric_column(df, col_name)?;
        Ok(ca
            .into_iter()
            .map(|opt| match opt {
                Some(v) => (v - params.mean) / params.std,
                None => f64::NAN,
            })
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Fetch a column as Float64, casting integers as needed.
fn numeric_column(df: &DataFrame, col_name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(col_name)
        .map_err(|_| StemflowError::ColumnNotFound(col_name.to_string()))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| StemflowError::DataError(e.to_string()))?;
    Ok(casted
        .as_materialized_series()
        .f64()
        .map_err(|e| StemflowError::DataError(e.to_string()))?
        .clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling_centers_data() {
        let df = df!("a" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &["a"]).unwrap();
        let scaled = scaler.transform_column(&df, "a").unwrap();

        let mean: f64 = scaled.iter().sum::<f64>() / scaled.len() as f64;
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let df = df!("a" => &[3.0, 3.0, 3.0]).unwrap();

        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &["a"]).unwrap();
        let scaled = scaler.transform_column(&df, "a").unwrap();

        assert!(scaled.iter().all(|v| v.is_finite()));
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_integer_columns_are_cast() {
        let df = df!("year" => &[2010i64, 2011, 2012]).unwrap();

        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &["year"]).unwrap();
        let scaled = scaler.transform_column(&df, "year").unwrap();
        assert_eq!(scaled.len(), 3);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = df!("a" => &[1.0]).unwrap();
        let scaler = StandardScaler::new();
        assert!(scaler.transform_column(&df, "a").is_err());
    }
}
