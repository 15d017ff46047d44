//! Command-line interface
//!
//! One subcommand per pipeline stage, plus `pipeline` to run the whole
//! task graph in order.

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::evaluation::evaluate_models;
use crate::monitoring::run_report;
use crate::paths::ProjectPaths;
use crate::pipeline::{build_pipeline, TaskOutcome};
use crate::preprocessing::run_preprocess;
use crate::serving::{run_server, ServerConfig};
use crate::training::{train_model, ModelKind};

#[derive(Parser)]
#[command(name = "stemflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ML pipeline for the Women-in-STEM graduation dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the raw dataset, fit the preprocessor, write processed matrices
    Preprocess,

    /// Train one model kind (randomforest, xgboost, catboost)
    Train {
        /// Model kind to train
        model: String,
    },

    /// Evaluate all persisted models on the held-out split
    Evaluate,

    /// Start the prediction service
    Serve {
        /// Server host (default: API_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Server port (default: API_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate the monitoring reports
    Report,

    /// Run the full task graph (preprocess, train x3, evaluate, report)
    Pipeline,
}

pub fn cmd_preprocess(paths: &ProjectPaths) -> anyhow::Result<()> {
    run_preprocess(paths)?;
    println!("{} preprocessing complete", "✓".green());
    Ok(())
}

pub fn cmd_train(paths: &ProjectPaths, model: &str) -> anyhow::Result<()> {
    let kind: ModelKind = model.parse()?;
    let metrics = train_model(kind, paths)?;
    println!(
        "{} {} training complete (rmse {:.3}, mae {:.3}, r2 {:.3})",
        "✓".green(),
        kind,
        metrics.rmse,
        metrics.mae,
        metrics.r2
    );
    Ok(())
}

pub fn cmd_evaluate(paths: &ProjectPaths) -> anyhow::Result<()> {
    evaluate_models(paths)?;
    Ok(())
}

pub async fn cmd_serve(
    paths: &ProjectPaths,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
    };
    run_server(config, paths).await
}

pub fn cmd_report(paths: &ProjectPaths) -> anyhow::Result<()> {
    run_report(paths)?;
    println!("{} monitoring reports written", "✓".green());
    Ok(())
}

pub fn cmd_pipeline(paths: &ProjectPaths) -> anyhow::Result<()> {
    let graph = build_pipeline(paths);
    let outcomes = graph.run()?;

    let mut failed = 0;
    for (name, outcome) in &outcomes {
        match outcome {
            TaskOutcome::Succeeded => println!("{} {}", "✓".green(), name),
            TaskOutcome::Failed(e) => {
                failed += 1;
                println!("{} {} ({})", "✗".red(), name, e);
            }
            TaskOutcome::Skipped => println!("{} {} (skipped)", "-".yellow(), name),
        }
    }

    if failed > 0 {
        anyhow::bail!("{} pipeline task(s) failed", failed);
    }
    Ok(())
}
