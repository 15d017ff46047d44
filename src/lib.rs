//! stemflow - ML pipeline for the Women-in-STEM graduation dataset
//!
//! A small, linear pipeline: load a tabular dataset, preprocess it, train
//! three regression models, evaluate them, serve predictions over HTTP,
//! and generate data-drift monitoring reports.
//!
//! # Modules
//!
//! - [`data`] - CSV loading and column-name cleaning
//! - [`preprocessing`] - Scaling, one-hot encoding, the fitted pipeline
//! - [`training`] - The three regressors, split, metrics, training runs
//! - [`evaluation`] - Held-out metric table for persisted models
//! - [`tracking`] - Local experiment tracking
//! - [`serving`] - HTTP prediction service
//! - [`monitoring`] - Drift and stability reports
//! - [`pipeline`] - Static task graph runner
//! - [`cli`] - Command-line interface

pub mod error;

pub mod data;
pub mod evaluation;
pub mod monitoring;
pub mod paths;
pub mod pipeline;
pub mod preprocessing;
pub mod serving;
pub mod tracking;
pub mod training;

pub mod cli;

pub use error::{Result, StemflowError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, StemflowError};
    pub use crate::monitoring::{DataDriftReport, DataStabilityReport};
    pub use crate::paths::ProjectPaths;
    pub use crate::pipeline::{build_pipeline, TaskGraph, TaskOutcome};
    pub use crate::preprocessing::Preprocessor;
    pub use crate::serving::{AppState, ServerConfig};
    pub use crate::tracking::ExperimentTracker;
    pub use crate::training::{
        train_test_split, ModelKind, RegressionMetrics, TrainedRegressor,
    };
}
