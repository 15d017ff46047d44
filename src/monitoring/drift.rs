//! Drift statistics: two-sample KS test and Population Stability Index

use crate::error::{Result, StemflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Default significance level for the KS test.
const KS_ALPHA: f64 = 0.05;

/// Quantile bins used by the PSI calculation.
const PSI_BINS: usize = 10;

/// PSI above this counts as drift.
const PSI_THRESHOLD: f64 = 0.2;

/// Small count added to every bin so empty bins do not blow up the log term.
const PSI_EPSILON: f64 = 1e-4;

/// Which statistic produced a drift verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftMethod {
    KolmogorovSmirnov,
    PopulationStability,
}

impl DriftMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftMethod::KolmogorovSmirnov => "KS test",
            DriftMethod::PopulationStability => "PSI",
        }
    }
}

/// One drift check result for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    pub method: DriftMethod,
    pub statistic: f64,
    pub threshold: f64,
    pub drifted: bool,
}

/// Per-column drift checks between a reference and a current dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDriftReport {
    pub checks: Vec<ColumnDrift>,
    pub reference_rows: usize,
    pub current_rows: usize,
}

impl DataDriftReport {
    /// Run KS + PSI on every numeric column and frequency-PSI on every
    /// string column the two frames share.
    pub fn compute(reference: &DataFrame, current: &DataFrame) -> Result<Self> {
        let mut checks = Vec::new();

        if reference.height() == 0 || current.height() == 0 {
            // One side of the year cutoff is empty; nothing to compare
            return Ok(Self {
                checks,
                reference_rows: reference.height(),
                current_rows: current.height(),
            });
        }

        for col in reference.get_columns() {
            let name = col.name().to_string();
            let Ok(cur_col) = current.column(&name) else {
                continue;
            };

            if is_numeric(col.dtype()) && is_numeric(cur_col.dtype()) {
                let ref_vals = numeric_values(reference, &name)?;
                let cur_vals = numeric_values(current, &name)?;
                if ref_vals.is_empty() || cur_vals.is_empty() {
                    continue;
                }

                let ks = ks_statistic(&ref_vals, &cur_vals);
                let ks_threshold = ks_critical_value(ref_vals.len(), cur_vals.len());
                checks.push(ColumnDrift {
                    column: name.clone(),
                    method: DriftMethod::KolmogorovSmirnov,
                    statistic: ks,
                    threshold: ks_threshold,
                    drifted: ks > ks_threshold,
                });

                let psi = population_stability_index(&ref_vals, &cur_vals, PSI_BINS);
                checks.push(ColumnDrift {
                    column: name,
                    method: DriftMethod::PopulationStability,
                    statistic: psi,
                    threshold: PSI_THRESHOLD,
                    drifted: psi > PSI_THRESHOLD,
                });
            } else if col.dtype() == &DataType::String {
                let psi = categorical_psi(reference, current, &name)?;
                checks.push(ColumnDrift {
                    column: name,
                    method: DriftMethod::PopulationStability,
                    statistic: psi,
                    threshold: PSI_THRESHOLD,
                    drifted: psi > PSI_THRESHOLD,
                });
            }
        }

        Ok(Self {
            checks,
            reference_rows: reference.height(),
            current_rows: current.height(),
        })
    }

    /// Number of checks that flagged drift.
    pub fn n_drifted(&self) -> usize {
        self.checks.iter().filter(|c| c.drifted).count()
    }
}

/// Two-sample Kolmogorov-Smirnov statistic: the maximum absolute distance
/// between the empirical CDFs.
pub fn ks_statistic(reference: &[f64], current: &[f64]) -> f64 {
    let mut ref_sorted = reference.to_vec();
    let mut cur_sorted = current.to_vec();
    ref_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    cur_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut combined: Vec<f64> = ref_sorted.iter().chain(cur_sorted.iter()).copied().collect();
    combined.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    combined.dedup();

    combined
        .iter()
        .map(|&x| (ecdf(&ref_sorted, x) - ecdf(&cur_sorted, x)).abs())
        .fold(0.0, f64::max)
}

fn ecdf(sorted: &[f64], x: f64) -> f64 {
    let count = sorted.partition_point(|&v| v <= x);
    count as f64 / sorted.len() as f64
}

/// Approximate two-sample KS critical value at the fixed alpha.
fn ks_critical_value(n1: usize, n2: usize) -> f64 {
    let c_alpha = match KS_ALPHA {
        a if a <= 0.01 => 1.63,
        a if a <= 0.05 => 1.36,
        a if a <= 0.10 => 1.22,
        _ => 1.07,
    };
    c_alpha * ((n1 + n2) as f64 / (n1 * n2) as f64).sqrt()
}

/// PSI over quantile bins derived from the reference distribution.
pub fn population_stability_index(reference: &[f64], current: &[f64], n_bins: usize) -> f64 {
    let n_bins = n_bins.max(2);
    let mut sorted = reference.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut edges = Vec::with_capacity(n_bins + 1);
    edges.push(f64::NEG_INFINITY);
    for i in 1..n_bins {
        let idx = (i * sorted.len()) / n_bins;
        edges.push(sorted[idx.min(sorted.len() - 1)]);
    }
    edges.push(f64::INFINITY);

    let ref_frac = bin_fractions(reference, &edges, n_bins);
    let cur_frac = bin_fractions(current, &edges, n_bins);

    ref_frac
        .iter()
        .zip(cur_frac.iter())
        .map(|(&r, &c)| {
            let r = r + PSI_EPSILON;
            let c = c + PSI_EPSILON;
            (c - r) * (c / r).ln()
        })
        .sum()
}

fn bin_fractions(data: &[f64], edges: &[f64], n_bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_bins];
    for &value in data {
        let mut bin = 0;
        for i in 0..n_bins {
            if value > edges[i] && value <= edges[i + 1] {
                bin = i;
                break;
            }
        }
        counts[bin] += 1;
    }
    let n = data.len().max(1) as f64;
    counts.iter().map(|&c| c as f64 / n).collect()
}

/// PSI over category frequencies for a string column.
fn categorical_psi(reference: &DataFrame, current: &DataFrame, column: &str) -> Result<f64> {
    let ref_freq = level_frequencies(reference, column)?;
    let cur_freq = level_frequencies(current, column)?;

    let mut levels: Vec<&String> = ref_freq.keys().chain(cur_freq.keys()).collect();
    levels.sort();
    levels.dedup();

    Ok(levels
        .iter()
        .map(|level| {
            let r = ref_freq.get(*level).copied().unwrap_or(0.0) + PSI_EPSILON;
            let c = cur_freq.get(*level).copied().unwrap_or(0.0) + PSI_EPSILON;
            (c - r) * (c / r).ln()
        })
        .sum())
}

fn level_frequencies(df: &DataFrame, column: &str) -> Result<HashMap<String, f64>> {
    let ca = df
        .column(column)
        .map_err(|_| StemflowError::ColumnNotFound(column.to_string()))?
        .str()
        .map_err(|e| StemflowError::DataError(e.to_string()))?;

    let mut counts: HashMap<String, f64> = HashMap::new();
    let mut total = 0.0;
    for val in ca.into_iter().flatten() {
        *counts.entry(val.to_string()).or_insert(0.0) += 1.0;
        total += 1.0;
    }
    if total > 0.0 {
        for v in counts.values_mut() {
            *v /= total;
        }
    }
    Ok(counts)
}

/// Non-null numeric values of one column, cast to f64.
pub(crate) fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let casted = df
        .column(column)
        .map_err(|_| StemflowError::ColumnNotFound(column.to_string()))?
        .cast(&DataType::Float64)
        .map_err(|e| StemflowError::DataError(e.to_string()))?;
    Ok(casted
        .as_materialized_series()
        .f64()
        .map_err(|e| StemflowError::DataError(e.to_string()))?
        .into_iter()
        .flatten()
        .collect())
}

pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ks_identical_samples() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(ks_statistic(&data, &data) < 1e-12);
    }

    #[test]
    fn test_ks_disjoint_samples() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![10.0, 11.0, 12.0];
        assert!((ks_statistic(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_psi_identical_distribution_is_small() {
        let data: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let psi = population_stability_index(&data, &data, 10);
        assert!(psi.abs() < 0.01, "psi was {}", psi);
    }

    #[test]
    fn test_psi_shifted_distribution_is_large() {
        let reference: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let current: Vec<f64> = (0..100).map(|i| i as f64 + 1000.0).collect();
        let psi = population_stability_index(&reference, &current, 10);
        assert!(psi > PSI_THRESHOLD, "psi was {}", psi);
    }

    #[test]
    fn test_constant_current_does_not_panic() {
        let reference: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let current = vec![25.0; 50];
        let psi = population_stability_index(&reference, &current, 10);
        assert!(psi.is_finite());
    }

    #[test]
    fn test_report_covers_numeric_and_categorical() {
        let reference = df!(
            "year" => &[2009i64, 2010, 2011],
            "rate" => &[30.0, 31.0, 32.0],
            "country" => &["A", "B", "A"]
        )
        .unwrap();
        let current = df!(
            "year" => &[2013i64, 2014, 2015],
            "rate" => &[35.0, 36.0, 37.0],
            "country" => &["A", "C", "C"]
        )
        .unwrap();

        let report = DataDriftReport::compute(&reference, &current).unwrap();
        // year: KS + PSI, rate: KS + PSI, country: PSI
        assert_eq!(report.checks.len(), 5);
        assert!(report.checks.iter().all(|c| c.statistic.is_finite()));
    }

    #[test]
    fn test_empty_side_yields_empty_report() {
        let reference = df!("year" => &[2009i64], "rate" => &[30.0]).unwrap();
        let empty = reference.head(Some(0));
        let report = DataDriftReport::compute(&reference, &empty).unwrap();
        assert!(report.checks.is_empty());
    }
}
