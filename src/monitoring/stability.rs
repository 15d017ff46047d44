//! Data-stability test suite
//!
//! Cheap per-column sanity tests comparing the current period against the
//! reference period: null share, constant columns, out-of-range values,
//! mean shift, and new categorical levels.

use super::drift::{is_numeric, numeric_values};
use crate::error::{Result, StemflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Share of nulls in the current period above which the check fails.
const MAX_NULL_SHARE: f64 = 0.2;

/// Share of current values outside the reference min/max above which the
/// range check fails.
const MAX_OUT_OF_RANGE_SHARE: f64 = 0.1;

/// Mean shift in reference standard deviations above which the check fails.
const MAX_MEAN_SHIFT_STDS: f64 = 2.0;

/// One stability test outcome for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityCheck {
    pub column: String,
    pub check: String,
    pub detail: String,
    pub passed: bool,
}

/// Stability test results for a reference/current pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataStabilityReport {
    pub checks: Vec<StabilityCheck>,
    pub reference_rows: usize,
    pub current_rows: usize,
}

impl DataStabilityReport {
    pub fn compute(reference: &DataFrame, current: &DataFrame) -> Result<Self> {
        let mut checks = Vec::new();

        if reference.height() == 0 || current.height() == 0 {
            return Ok(Self {
                checks,
                reference_rows: reference.height(),
                current_rows: current.height(),
            });
        }

        for col in reference.get_columns() {
            let name = col.name().to_string();
            let Ok(cur_col) = current.column(&name) else {
                checks.push(StabilityCheck {
                    column: name,
                    check: "column present".to_string(),
                    detail: "column missing from current period".to_string(),
                    passed: false,
                });
                continue;
            };

            checks.push(null_share_check(&name, cur_col, current.height()));

            if is_numeric(col.dtype()) && is_numeric(cur_col.dtype()) {
                let ref_vals = numeric_values(reference, &name)?;
                let cur_vals = numeric_values(current, &name)?;
                if !ref_vals.is_empty() && !cur_vals.is_empty() {
                    checks.push(range_check(&name, &ref_vals, &cur_vals));
                    checks.push(mean_shift_check(&name, &ref_vals, &cur_vals));
                }
            } else if col.dtype() == &DataType::String {
                checks.push(new_levels_check(reference, current, &name)?);
            }
        }

        Ok(Self {
            checks,
            reference_rows: reference.height(),
            current_rows: current.height(),
        })
    }

    pub fn n_failed(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

fn null_share_check(name: &str, column: &Column, height: usize) -> StabilityCheck {
    let share = column.null_count() as f64 / height.max(1) as f64;
    StabilityCheck {
        column: name.to_string(),
        check: "null share".to_string(),
        detail: format!("{:.1}% null", share * 100.0),
        passed: share <= MAX_NULL_SHARE,
    }
}

fn range_check(name: &str, ref_vals: &[f64], cur_vals: &[f64]) -> StabilityCheck {
    let ref_min = ref_vals.iter().copied().fold(f64::INFINITY, f64::min);
    let ref_max = ref_vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let out = cur_vals
        .iter()
        .filter(|v| **v < ref_min || **v > ref_max)
        .count();
    let share = out as f64 / cur_vals.len() as f64;

    StabilityCheck {
        column: name.to_string(),
        check: "value range".to_string(),
        detail: format!(
            "{:.1}% outside reference range [{:.3}, {:.3}]",
            share * 100.0,
            ref_min,
            ref_max
        ),
        passed: share <= MAX_OUT_OF_RANGE_SHARE,
    }
}

fn mean_shift_check(name: &str, ref_vals: &[f64], cur_vals: &[f64]) -> StabilityCheck {
    let ref_mean = mean(ref_vals);
    let cur_mean = mean(cur_vals);
    let ref_std = std_dev(ref_vals, ref_mean);

    // Constant reference columns compare on absolute difference instead
    let shift = if ref_std > 1e-12 {
        (cur_mean - ref_mean).abs() / ref_std
    } else if (cur_mean - ref_mean).abs() < 1e-12 {
        0.0
    } else {
        f64::INFINITY
    };

    StabilityCheck {
        column: name.to_string(),
        check: "mean shift".to_string(),
        detail: format!(
            "reference mean {:.3}, current mean {:.3} ({:.2} stds)",
            ref_mean, cur_mean, shift
        ),
        passed: shift <= MAX_MEAN_SHIFT_STDS,
    }
}

fn new_levels_check(reference: &DataFrame, current: &DataFrame, name: &str) -> Result<StabilityCheck> {
    let levels = |df: &DataFrame| -> Result<Vec<String>> {
        let ca = df
            .column(name)
            .map_err(|_| StemflowError::ColumnNotFound(name.to_string()))?
            .str()
            .map_err(|e| StemflowError::DataError(e.to_string()))?;
        let mut out: Vec<String> = ca.into_iter().flatten().map(|s| s.to_string()).collect();
        out.sort();
        out.dedup();
        Ok(out)
    };

    let ref_levels = levels(reference)?;
    let new: Vec<String> = levels(current)?
        .into_iter()
        .filter(|l| !ref_levels.contains(l))
        .collect();

    Ok(StabilityCheck {
        column: name.to_string(),
        check: "new levels".to_string(),
        detail: if new.is_empty() {
            "no unseen levels".to_string()
        } else {
            format!("unseen levels: {}", new.join(", "))
        },
        passed: new.is_empty(),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> (DataFrame, DataFrame) {
        let reference = df!(
            "rate" => &[30.0, 31.0, 32.0, 33.0],
            "country" => &["A", "B", "A", "B"]
        )
        .unwrap();
        let current = df!(
            "rate" => &[31.0, 32.0, 32.5, 33.0],
            "country" => &["A", "B", "B", "A"]
        )
        .unwrap();
        (reference, current)
    }

    #[test]
    fn test_stable_data_passes() {
        let (reference, current) = frames();
        let report = DataStabilityReport::compute(&reference, &current).unwrap();
        assert!(report.n_failed() == 0, "failures: {:?}", report.checks);
    }

    #[test]
    fn test_new_level_fails_check() {
        let (reference, _) = frames();
        let current = df!(
            "rate" => &[31.0, 32.0],
            "country" => &["A", "Z"]
        )
        .unwrap();
        let report = DataStabilityReport::compute(&reference, &current).unwrap();
        let failed: Vec<&StabilityCheck> =
            report.checks.iter().filter(|c| !c.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].check, "new levels");
    }

    #[test]
    fn test_constant_current_completes() {
        let (reference, _) = frames();
        let current = df!(
            "rate" => &[32.0, 32.0, 32.0],
            "country" => &["A", "A", "A"]
        )
        .unwrap();
        let report = DataStabilityReport::compute(&reference, &current).unwrap();
        assert!(!report.checks.is_empty());
    }

    #[test]
    fn test_large_mean_shift_fails() {
        let (reference, _) = frames();
        let current = df!(
            "rate" => &[300.0, 310.0],
            "country" => &["A", "B"]
        )
        .unwrap();
        let report = DataStabilityReport::compute(&reference, &current).unwrap();
        assert!(report
            .checks
            .iter()
            .any(|c| c.check == "mean shift" && !c.passed));
    }
}
