//! Data monitoring: reference/current drift and stability reports
//!
//! The raw dataset is split by a hardcoded year boundary into a reference
//! period and a current period, then two HTML reports are generated: a
//! data-stability test suite and a data-drift report.

mod drift;
mod report;
mod stability;

pub use drift::{ks_statistic, population_stability_index, ColumnDrift, DataDriftReport, DriftMethod};
pub use report::{render_drift_html, render_stability_html};
pub use stability::{DataStabilityReport, StabilityCheck};

use crate::data::load_and_clean;
use crate::error::{Result, StemflowError};
use crate::paths::ProjectPaths;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// Rows with `year` strictly below this belong to the reference period.
pub const REFERENCE_YEAR_CUTOFF: i64 = 2012;

/// Split a cleaned frame into `(reference, current)` by the year cutoff.
pub fn split_reference_current(df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
    let year = df
        .column("year")
        .map_err(|_| StemflowError::ColumnNotFound("year".to_string()))?
        .cast(&DataType::Int64)
        .map_err(|e| StemflowError::DataError(e.to_string()))?;
    let year_ca = year
        .as_materialized_series()
        .i64()
        .map_err(|e| StemflowError::DataError(e.to_string()))?
        .clone();

    let ref_mask: BooleanChunked = (&year_ca)
        .into_iter()
        .map(|opt| opt.map(|y| y < REFERENCE_YEAR_CUTOFF))
        .collect();
    let cur_mask: BooleanChunked = (&year_ca)
        .into_iter()
        .map(|opt| opt.map(|y| y >= REFERENCE_YEAR_CUTOFF))
        .collect();

    let reference = df.filter(&ref_mask)?;
    let current = df.filter(&cur_mask)?;
    Ok((reference, current))
}

/// Generate both monitoring reports for a cleaned dataset, writing
/// `data_stability.html` and `data_drift.html` under `out_dir`.
pub fn generate_reports(df: &DataFrame, out_dir: PathBuf) -> Result<(PathBuf, PathBuf)> {
    let (reference, current) = split_reference_current(df)?;
    info!(
        reference_rows = reference.height(),
        current_rows = current.height(),
        cutoff = REFERENCE_YEAR_CUTOFF,
        "Split dataset for monitoring"
    );

    let stability = DataStabilityReport::compute(&reference, &current)?;
    let drift = DataDriftReport::compute(&reference, &current)?;

    std::fs::create_dir_all(&out_dir)?;
    let stability_path = out_dir.join("data_stability.html");
    let drift_path = out_dir.join("data_drift.html");

    std::fs::write(&stability_path, render_stability_html(&stability))?;
    std::fs::write(&drift_path, render_drift_html(&drift))?;

    info!(
        stability = %stability_path.display(),
        drift = %drift_path.display(),
        "Monitoring reports written"
    );
    Ok((stability_path, drift_path))
}

/// Full monitoring stage: load and clean the raw CSV, then generate both
/// reports under the fixed reports directory.
pub fn run_report(paths: &ProjectPaths) -> Result<()> {
    let df = load_and_clean(&paths.raw_data())?;
    generate_reports(&df, paths.reports_dir())?;
    Ok(())
}
