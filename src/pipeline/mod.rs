//! Static task graph runner
//!
//! The pipeline is a fixed DAG: preprocess fans out to the three trainers,
//! which fan back in to evaluation, followed by the monitoring report. A
//! task starts only once every declared predecessor has succeeded; a failed
//! task (once its retries are exhausted) blocks all downstream tasks. There is no
//! schedule and no catchup; runs are triggered manually.

use crate::error::{Result, StemflowError};
use crate::paths::ProjectPaths;
use crate::training::ModelKind;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{error, info, warn};

/// Retries per task after the first failure.
pub const TASK_RETRIES: usize = 1;

/// Fixed delay before a retry.
pub const RETRY_DELAY: Duration = Duration::from_secs(120);

type TaskAction = Box<dyn Fn() -> Result<()> + Send + Sync>;

struct Task {
    name: String,
    deps: Vec<String>,
    action: TaskAction,
}

/// Terminal state of one task in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed(String),
    /// Not run because a predecessor failed.
    Skipped,
}

/// A named DAG of tasks with a fixed retry policy.
pub struct TaskGraph {
    tasks: Vec<Task>,
    retries: usize,
    retry_delay: Duration,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            retries: TASK_RETRIES,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the retry delay (tests use milliseconds).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Register a task with its predecessor names.
    pub fn add_task<F>(&mut self, name: &str, deps: &[&str], action: F) -> &mut Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.tasks.push(Task {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action: Box::new(action),
        });
        self
    }

    /// Execute the graph. Ready tasks run in parallel; the run itself
    /// returns Ok even when tasks fail (their outcomes say so), and Err
    /// only for a malformed graph.
    pub fn run(&self) -> Result<HashMap<String, TaskOutcome>> {
        self.validate()?;

        let mut outcomes: HashMap<String, TaskOutcome> = HashMap::new();

        loop {
            let ready: Vec<&Task> = self
                .tasks
                .iter()
                .filter(|t| {
                    !outcomes.contains_key(&t.name)
                        && t.deps
                            .iter()
                            .all(|d| outcomes.get(d) == Some(&TaskOutcome::Succeeded))
                })
                .collect();

            if !ready.is_empty() {
                let batch: Vec<(String, TaskOutcome)> = ready
                    .par_iter()
                    .map(|task| (task.name.clone(), self.run_task(task)))
                    .collect();
                outcomes.extend(batch);
                continue;
            }

            // Propagate failures: skip tasks with a failed or skipped dep
            let mut progressed = false;
            for task in &self.tasks {
                let blocked = !outcomes.contains_key(&task.name)
                    && task.deps.iter().any(|d| {
                        matches!(
                            outcomes.get(d),
                            Some(TaskOutcome::Failed(_)) | Some(TaskOutcome::Skipped)
                        )
                    });
                if blocked {
                    warn!(task = %task.name, "Skipping task, upstream failure");
                    outcomes.insert(task.name.clone(), TaskOutcome::Skipped);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        if outcomes.len() < self.tasks.len() {
            return Err(StemflowError::PipelineError(
                "dependency cycle detected".to_string(),
            ));
        }

        Ok(outcomes)
    }

    fn run_task(&self, task: &Task) -> TaskOutcome {
        let attempts = self.retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            info!(task = %task.name, attempt, "Running task");
            match (task.action)() {
                Ok(()) => {
                    info!(task = %task.name, "Task succeeded");
                    return TaskOutcome::Succeeded;
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        warn!(
                            task = %task.name,
                            error = %last_error,
                            delay_secs = self.retry_delay.as_secs_f64(),
                            "Task failed, retrying after delay"
                        );
                        std::thread::sleep(self.retry_delay);
                    } else {
                        error!(task = %task.name, error = %last_error, "Task failed");
                    }
                }
            }
        }

        TaskOutcome::Failed(last_error)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = Vec::new();
        for task in &self.tasks {
            if seen.contains(&&task.name) {
                return Err(StemflowError::PipelineError(format!(
                    "duplicate task: {}",
                    task.name
                )));
            }
            seen.push(&task.name);
        }
        for task in &self.tasks {
            for dep in &task.deps {
                if !self.tasks.iter().any(|t| &t.name == dep) {
                    return Err(StemflowError::PipelineError(format!(
                        "task {} depends on unknown task {}",
                        task.name, dep
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the full pipeline graph:
/// preprocess → {train_randomforest, train_xgboost, train_catboost}
/// → evaluate_models → monitoring_report.
pub fn build_pipeline(paths: &ProjectPaths) -> TaskGraph {
    let mut graph = TaskGraph::new();

    let p = paths.clone();
    graph.add_task("preprocess", &[], move || {
        crate::preprocessing::run_preprocess(&p)
    });

    let mut train_names = Vec::new();
    for kind in ModelKind::ALL {
        let name = format!("train_{}", kind);
        let p = paths.clone();
        graph.add_task(&name, &["preprocess"], move || {
            crate::training::train_model(kind, &p).map(|_| ())
        });
        train_names.push(name);
    }

    let deps: Vec<&str> = train_names.iter().map(|s| s.as_str()).collect();
    let p = paths.clone();
    graph.add_task("evaluate_models", &deps, move || {
        crate::evaluation::evaluate_models(&p).map(|_| ())
    });

    let p = paths.clone();
    graph.add_task("monitoring_report", &["evaluate_models"], move || {
        crate::monitoring::run_report(&p)
    });

    graph
}
