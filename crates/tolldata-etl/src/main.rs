//! Tolldata ETL - toll data batch pipeline

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tolldata_common::logging::{init_logging, LogConfig, LogLevel};
use tolldata_etl::config::EtlConfig;
use tolldata_etl::dag::TaskStatus;
use tolldata_etl::pipeline;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "tolldata-etl")]
#[command(author, version, about = "Toll data ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Staging directory (overrides TOLLDATA_STAGING_DIR)
    #[arg(long, global = true)]
    staging_dir: Option<PathBuf>,

    /// Archive URL (overrides TOLLDATA_SOURCE_URL)
    #[arg(long, global = true)]
    source_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the whole graph
    Run {
        /// Write the run report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run a single task against the current staging area
    Task {
        /// Task id, e.g. extract_data_from_tsv
        id: String,
    },

    /// Print the task graph stages
    Graph,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("tolldata-etl")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Graph => {
            let graph = pipeline::toll_graph()?;
            for (i, stage) in graph.stages()?.iter().enumerate() {
                println!("{}: {}", i + 1, stage.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        },
        Command::Run { report } => {
            let config = load_config(cli.staging_dir, cli.source_url)?;
            let run = pipeline::run(config).await?;

            if let Some(path) = report {
                run.write_json(&path)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                info!(path = %path.display(), "Run report written");
            }

            for outcome in &run.tasks {
                println!(
                    "{:<32} {:<10} attempts={}",
                    outcome.task_id,
                    outcome.status.as_str(),
                    outcome.attempts
                );
            }

            if run.succeeded() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Task { id } => {
            let config = load_config(cli.staging_dir, cli.source_url)?;
            let outcome = pipeline::run_task(config, &id).await?;

            if outcome.status == TaskStatus::Succeeded {
                info!(task_id = %id, attempts = outcome.attempts, "Task complete");
                Ok(ExitCode::SUCCESS)
            } else {
                error!(
                    task_id = %id,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "Task failed"
                );
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

fn load_config(staging_dir: Option<PathBuf>, source_url: Option<String>) -> Result<EtlConfig> {
    let mut config = EtlConfig::from_env().context("Failed to load configuration")?;

    if let Some(dir) = staging_dir {
        config.staging_dir = dir;
    }
    if let Some(url) = source_url {
        config.source_url = url;
    }

    config.validate()?;
    Ok(config)
}
