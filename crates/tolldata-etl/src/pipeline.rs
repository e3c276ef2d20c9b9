//! The toll data task graph

use async_trait::async_trait;
use std::sync::Arc;
use tolldata_common::{EtlError, Result};
use tracing::info;

use crate::config::EtlConfig;
use crate::consolidate::consolidate;
use crate::dag::{BlockingTask, RunContext, RunReport, Runner, Task, TaskGraph, TaskOutcome};
use crate::extract::{extract_payment_data, extract_toll_plaza_data, extract_vehicle_data};
use crate::fetch::fetch_archive;
use crate::transform::transform;
use crate::unpack::unpack_archive;

pub const DAG_ID: &str = "ETL_toll_data";

pub const DOWNLOAD: &str = "download_dataset";
pub const UNTAR: &str = "untar_dataset";
pub const EXTRACT_CSV: &str = "extract_data_from_csv";
pub const EXTRACT_TSV: &str = "extract_data_from_tsv";
pub const EXTRACT_FIXED_WIDTH: &str = "extract_data_from_fixed_width";
pub const CONSOLIDATE: &str = "consolidate_data";
pub const TRANSFORM: &str = "transform_data";

/// The only task that talks to the network
struct DownloadTask;

#[async_trait]
impl Task for DownloadTask {
    fn id(&self) -> &str {
        DOWNLOAD
    }

    async fn run(&self, ctx: &RunContext) -> Result<()> {
        fetch_archive(
            &ctx.http,
            &ctx.config.source_url,
            &ctx.staging,
            ctx.config.show_progress,
        )
        .await
        .map(|_| ())
    }
}

/// Build the seven-task graph
pub fn toll_graph() -> Result<TaskGraph> {
    let mut graph = TaskGraph::new(DAG_ID);

    graph.add_task(Arc::new(DownloadTask), &[])?;
    graph.add_task(
        Arc::new(BlockingTask::new(UNTAR, |ctx: &RunContext| {
            unpack_archive(&ctx.staging).map(|_| ())
        })),
        &[DOWNLOAD],
    )?;

    graph.add_task(
        Arc::new(BlockingTask::new(EXTRACT_CSV, |ctx: &RunContext| {
            extract_vehicle_data(&ctx.staging).map(|_| ())
        })),
        &[UNTAR],
    )?;
    graph.add_task(
        Arc::new(BlockingTask::new(EXTRACT_TSV, |ctx: &RunContext| {
            extract_toll_plaza_data(&ctx.staging).map(|_| ())
        })),
        &[UNTAR],
    )?;
    graph.add_task(
        Arc::new(BlockingTask::new(EXTRACT_FIXED_WIDTH, |ctx: &RunContext| {
            extract_payment_data(&ctx.staging).map(|_| ())
        })),
        &[UNTAR],
    )?;

    graph.add_task(
        Arc::new(BlockingTask::new(CONSOLIDATE, |ctx: &RunContext| {
            consolidate(&ctx.staging, ctx.config.join_mode).map(|_| ())
        })),
        &[EXTRACT_CSV, EXTRACT_TSV, EXTRACT_FIXED_WIDTH],
    )?;
    graph.add_task(
        Arc::new(BlockingTask::new(TRANSFORM, |ctx: &RunContext| {
            transform(&ctx.staging).map(|_| ())
        })),
        &[CONSOLIDATE],
    )?;

    graph.validate()?;
    Ok(graph)
}

/// Execute the whole graph once
pub async fn run(config: EtlConfig) -> Result<RunReport> {
    let runner = Runner::new(config.retry_policy());
    let ctx = RunContext::new(config)?;
    info!(
        run_id = %ctx.run_id,
        staging_dir = %ctx.staging.root().display(),
        source_url = %ctx.config.source_url,
        "Pipeline run starting"
    );

    let graph = toll_graph()?;
    runner.run(&graph, &ctx).await
}

/// Execute a single task with the configured retry policy.
///
/// Dependencies are not run; the task finds whatever earlier runs left in the
/// staging area.
pub async fn run_task(config: EtlConfig, task_id: &str) -> Result<TaskOutcome> {
    let graph = toll_graph()?;
    let task = graph.task(task_id).ok_or_else(|| {
        let known: Vec<&str> = graph.task_ids().collect();
        EtlError::Graph(format!(
            "unknown task '{}', expected one of: {}",
            task_id,
            known.join(", ")
        ))
    })?;

    let runner = Runner::new(config.retry_policy());
    let ctx = RunContext::new(config)?;
    Ok(runner.run_task(task.as_ref(), &ctx).await)
}
