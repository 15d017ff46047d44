//! One-hot encoding for categorical columns

use crate::error::{Result, StemflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One-hot encoder over a fixed set of categorical columns.
///
/// The vocabulary per column is the distinct levels observed at fit time, in
/// first-seen order. Levels unseen at fit time encode as an all-zero
/// indicator row rather than raising, so serving never fails on a new
/// country or field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // (column, ordered vocabulary) in fit-call column order
    vocabularies: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the vocabulary of each named column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.vocabularies.clear();

        for col_name in columns {
            let ca = string_column(df, col_name)?;
            let mut levels: Vec<String> = Vec::new();
            for val in ca.into_iter().flatten() {
                if !levels.iter().any(|l| l == val) {
                    levels.push(val.to_string());
                }
            }
            self.vocabularies.push((col_name.to_string(), levels));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode one column as indicator vectors, one row per input row.
    ///
    /// Each inner vector has one slot per vocabulary level; unknown or null
    /// values yield all zeros.
    pub fn transform_column(&self, df: &DataFrame, col_name: &str) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted {
            return Err(StemflowError::ModelNotFitted);
        }
        let levels = self
            .vocabulary(col_name)
            .ok_or_else(|| StemflowError::ColumnNotFound(col_name.to_string()))?;

        let ca = string_column(df, col_name)?;
        Ok(ca
            .into_iter()
            .map(|opt| {
                let mut row = vec![0.0; levels.len()];
                if let Some(val) = opt {
                    if let Some(idx) = levels.iter().position(|l| l == val) {
                        row[idx] = 1.0;
                    }
                }
                row
            })
            .collect())
    }

    /// Vocabulary for one column, if fitted.
    pub fn vocabulary(&self, col_name: &str) -> Option<&[String]> {
        self.vocabularies
            .iter()
            .find(|(name, _)| name == col_name)
            .map(|(_, levels)| levels.as_slice())
    }

    /// Indicator column names for one column, `{col}_{level}`.
    pub fn indicator_names(&self, col_name: &str) -> Vec<String> {
        self.vocabulary(col_name)
            .map(|levels| {
                levels
                    .iter()
                    .map(|l| format!("{}_{}", col_name, l))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

fn string_column<'a>(df: &'a DataFrame, col_name: &str) -> Result<&'a StringChunked> {
    df.column(col_name)
        .map_err(|_| StemflowError::ColumnNotFound(col_name.to_string()))?
        .str()
        .map_err(|e| StemflowError::DataError(e.to_string()))
}
