//! Fixed artifact locations relative to the project root.
//!
//! Every process in the pipeline (preprocess, train, evaluate, serve,
//! report) resolves the same paths from the same root, so artifacts written
//! by one stage are found by the next without any configuration.

use std::path::{Path, PathBuf};

/// Raw dataset file name under `data/raw/`.
pub const RAW_DATASET: &str = "women_in_stem.csv";

/// Project-root-relative locations of every persisted artifact.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    /// Resolve paths against an explicit project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve paths against the current working directory.
    pub fn from_cwd() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `data/raw/women_in_stem.csv`
    pub fn raw_data(&self) -> PathBuf {
        self.root.join("data").join("raw").join(RAW_DATASET)
    }

    /// `data/processed/`
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    /// `data/processed/X.json`
    pub fn features_matrix(&self) -> PathBuf {
        self.processed_dir().join("X.json")
    }

    /// `data/processed/y.json`
    pub fn target_vector(&self) -> PathBuf {
        self.processed_dir().join("y.json")
    }

    /// `models/`
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// `models/preprocessor.json`
    pub fn preprocessor(&self) -> PathBuf {
        self.models_dir().join("preprocessor.json")
    }

    /// `models/<name>.json`
    pub fn model(&self, name: &str) -> PathBuf {
        self.models_dir().join(format!("{}.json", name))
    }

    /// `mlruns/`, the experiment tracking store
    pub fn tracking_dir(&self) -> PathBuf {
        self.root.join("mlruns")
    }

    /// `monitoring/reports/`
    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("monitoring").join("reports")
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::from_cwd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_root_relative() {
        let paths = ProjectPaths::new("/proj");
        assert_eq!(
            paths.raw_data(),
            PathBuf::from("/proj/data/raw/women_in_stem.csv")
        );
        assert_eq!(paths.model("xgboost"), PathBuf::from("/proj/models/xgboost.json"));
        assert_eq!(
            paths.reports_dir(),
            PathBuf::from("/proj/monitoring/reports")
        );
    }
}
