//! Dataset loading and column-name cleaning

use crate::error::{Result, StemflowError};
use polars::prelude::*;
use regex::Regex;
use std::fs::File;
use std::path::Path;

/// Load a CSV file with a header row and inferred schema.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| {
        StemflowError::DataError(format!("{}: {}", path.display(), e))
    })?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| StemflowError::DataError(e.to_string()))
}

/// Normalize a single raw column name: lowercase, strip any parenthetical
/// annotation plus the whitespace before it, replace interior spaces with
/// underscores, and trim leading/trailing underscores.
///
/// `"Female Enrollment (%)"` becomes `"female_enrollment"`.
pub fn clean_column_name(name: &str) -> String {
    let parens = Regex::new(r"\s*\([^)]*\)").expect("valid regex");
    let lowered = name.to_lowercase();
    let stripped = parens.replace_all(&lowered, "");
    stripped
        .trim()
        .replace(' ', "_")
        .trim_matches('_')
        .to_string()
}

/// Apply [`clean_column_name`] to every column of a DataFrame.
pub fn clean_column_names(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    let renames: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .map(|old| (old.to_string(), clean_column_name(old.as_str())))
        .collect();

    for (old, new) in renames {
        if old != new {
            result
                .rename(&old, new.into())
                .map_err(|e| StemflowError::DataError(e.to_string()))?;
        }
    }

    Ok(result)
}

/// Load a CSV and clean its column names in one step.
pub fn load_and_clean(path: &Path) -> Result<DataFrame> {
    let df = load_csv(path)?;
    clean_column_names(&df)
}
