//! Experiment tracking
//!
//! A local, file-backed tracker laid out as one directory per experiment:
//! `mlruns/<experiment>/meta.json` plus one JSON file per recorded run.
//! Writers never touch each other's files, so parallel training runs need
//! no coordination. Nothing is retained in process memory beyond the
//! tracker instance itself.

use crate::error::{Result, StemflowError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Outcome of a recorded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// One recorded run: parameters in, metrics out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: String,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub params: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
}

impl Run {
    fn new(run_name: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            run_name: run_name.to_string(),
            status: RunStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            params: HashMap::new(),
            metrics: HashMap::new(),
        }
    }

    pub fn log_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    pub fn log_metric(&mut self, key: &str, value: f64) {
        self.metrics.insert(key.to_string(), value);
    }

    pub fn log_metrics(&mut self, metrics: &HashMap<String, f64>) {
        for (key, value) in metrics {
            self.metrics.insert(key.clone(), *value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExperimentMeta {
    name: String,
    created_at: DateTime<Utc>,
}

/// File-backed experiment tracker.
pub struct ExperimentTracker {
    experiment_dir: PathBuf,
    meta: ExperimentMeta,
    runs: Vec<Run>,
}

impl ExperimentTracker {
    /// Open (or create) the experiment directory for `experiment_name`
    /// and load any runs already recorded there.
    pub fn new(dir: PathBuf, experiment_name: &str) -> Result<Self> {
        let experiment_dir = dir.join(experiment_name);
        std::fs::create_dir_all(&experiment_dir)?;

        let meta_path = experiment_dir.join("meta.json");
        let meta = if meta_path.exists() {
            let json = std::fs::read_to_string(&meta_path)?;
            serde_json::from_str(&json).map_err(|e| {
                StemflowError::TrackingError(format!(
                    "corrupt experiment meta {}: {}",
                    meta_path.display(),
                    e
                ))
            })?
        } else {
            let meta = ExperimentMeta {
                name: experiment_name.to_string(),
                created_at: Utc::now(),
            };
            // Write via rename so a concurrently created tracker never
            // observes a partially written meta file
            let tmp_path = experiment_dir.join(format!(".meta-{}.tmp", Uuid::new_v4()));
            std::fs::write(&tmp_path, serde_json::to_string_pretty(&meta)?)?;
            std::fs::rename(&tmp_path, &meta_path)?;
            meta
        };

        let mut runs = Self::load_runs(&experiment_dir)?;
        runs.sort_by_key(|r| r.start_time);

        Ok(Self {
            experiment_dir,
            meta,
            runs,
        })
    }

    /// Begin a new run. The run is recorded only once passed back to
    /// [`ExperimentTracker::finish_run`].
    pub fn start_run(&mut self, run_name: &str) -> Run {
        debug!(run_name, "Starting tracked run");
        Run::new(run_name)
    }

    /// Mark the run finished and write it to its own file. Every run owns
    /// a distinct file, so concurrent writers cannot clobber each other.
    pub fn finish_run(&mut self, mut run: Run) -> Result<()> {
        run.status = RunStatus::Finished;
        run.end_time = Some(Utc::now());

        let run_path = self.experiment_dir.join(format!("run_{}.json", run.run_id));
        std::fs::write(&run_path, serde_json::to_string_pretty(&run)?)?;

        self.runs.push(run);
        Ok(())
    }

    /// Runs recorded so far (including those loaded from disk).
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn experiment_name(&self) -> &str {
        &self.meta.name
    }

    fn load_runs(experiment_dir: &PathBuf) -> Result<Vec<Run>> {
        let mut runs = Vec::new();
        for entry in std::fs::read_dir(experiment_dir)? {
            let path = entry?.path();
            let is_run_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("run_") && n.ends_with(".json"))
                .unwrap_or(false);
            if !is_run_file {
                continue;
            }

            let json = std::fs::read_to_string(&path)?;
            let run: Run = serde_json::from_str(&json).map_err(|e| {
                StemflowError::TrackingError(format!("corrupt run file {}: {}", path.display(), e))
            })?;
            runs.push(run);
        }
        Ok(runs)
    }
}
