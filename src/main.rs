//! stemflow - Main Entry Point

use clap::Parser;
use stemflow::cli::{
    cmd_evaluate, cmd_pipeline, cmd_preprocess, cmd_report, cmd_serve, cmd_train, Cli, Commands,
};
use stemflow::paths::ProjectPaths;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stemflow=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let paths = ProjectPaths::from_cwd();

    match cli.command {
        Commands::Preprocess => cmd_preprocess(&paths)?,
        Commands::Train { model } => cmd_train(&paths, &model)?,
        Commands::Evaluate => cmd_evaluate(&paths)?,
        Commands::Serve { host, port } => cmd_serve(&paths, host, port).await?,
        Commands::Report => cmd_report(&paths)?,
        Commands::Pipeline => cmd_pipeline(&paths)?,
    }

    Ok(())
}
