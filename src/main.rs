use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ml_sales_pipeline::config::AppConfig;
use ml_sales_pipeline::deploy::DeploymentManager;
use ml_sales_pipeline::pipeline::{watch, PipelineOrchestrator, RetrainOutcome};

/// Continuous-training pipeline for the sales prediction service.
#[derive(Parser)]
#[command(name = "pipeline", about = "Checksum-gated retraining pipeline")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "pipeline.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Install service dependencies
    Install,
    /// Check the dataset and retrain if it changed
    Retrain {
        /// Retrain even if the dataset is unchanged
        #[arg(long)]
        force: bool,
    },
    /// Build the service image from the current model
    Build,
    /// Full pipeline: install, retrain gate, image build
    Run {
        /// Retrain even if the dataset is unchanged
        #[arg(long)]
        force: bool,
    },
    /// Replace the running service container with the built image
    Deploy,
    /// Delete all model artifacts and reset the checksum record
    Clean,
    /// Poll the dataset and retrain whenever it changes
    Watch {
        /// Seconds between polls (default: pipeline.poll_interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    match cli.command {
        Cmd::Install => {
            PipelineOrchestrator::new(config).install()?;
        }
        Cmd::Retrain { force } => {
            let orchestrator = PipelineOrchestrator::new(config);
            let _guard = orchestrator.lock()?;
            report(orchestrator.retrain(force)?);
        }
        Cmd::Build => {
            PipelineOrchestrator::new(config).build()?;
        }
        Cmd::Run { force } => {
            let orchestrator = PipelineOrchestrator::new(config);
            let _guard = orchestrator.lock()?;
            report(orchestrator.run(force)?);
        }
        Cmd::Deploy => {
            let manager = DeploymentManager::new(config.image.runtime.clone());
            manager.deploy(
                &config.image.tag,
                &config.deploy.container_name,
                config.deploy.port,
            )?;
            println!(
                "deployed {} as {} on port {}",
                config.image.tag, config.deploy.container_name, config.deploy.port
            );
        }
        Cmd::Clean => {
            let removed = PipelineOrchestrator::new(config).clean()?;
            println!("removed {removed} model artifacts");
        }
        Cmd::Watch { interval } => {
            let secs = interval.unwrap_or(config.pipeline.poll_interval_secs);
            let orchestrator = PipelineOrchestrator::new(config);
            watch(&orchestrator, Duration::from_secs(secs));
        }
    }
    Ok(())
}

fn report(outcome: RetrainOutcome) {
    match outcome {
        RetrainOutcome::Skipped => println!("dataset unchanged, retrain skipped"),
        RetrainOutcome::Trained(tag) => println!("trained new model version {tag}"),
    }
}
