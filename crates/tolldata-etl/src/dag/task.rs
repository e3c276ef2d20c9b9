//! Task trait and run context

use async_trait::async_trait;
use std::sync::Arc;
use tolldata_common::{EtlError, Result};
use uuid::Uuid;

use crate::config::EtlConfig;
use crate::staging::StagingArea;

/// Everything a task may touch during one pipeline run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub staging: StagingArea,
    pub config: Arc<EtlConfig>,
    pub http: reqwest::Client,
}

impl RunContext {
    /// Open the configured staging area and build the HTTP client
    pub fn new(config: EtlConfig) -> Result<Self> {
        config.validate()?;
        let staging = StagingArea::create(&config.staging_dir)?;
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| EtlError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            run_id: Uuid::new_v4(),
            staging,
            config: Arc::new(config),
            http,
        })
    }
}

/// One unit of sequential work in the graph.
///
/// Tasks must be idempotent: a retry re-runs the whole body and overwrites
/// whatever a failed attempt left behind.
#[async_trait]
pub trait Task: Send + Sync {
    fn id(&self) -> &str;

    async fn run(&self, ctx: &RunContext) -> Result<()>;
}

type BlockingOp = dyn Fn(&RunContext) -> Result<()> + Send + Sync;

/// Task whose body is synchronous file work, run on the blocking pool
pub struct BlockingTask {
    id: String,
    op: Arc<BlockingOp>,
}

impl BlockingTask {
    pub fn new<F>(id: impl Into<String>, op: F) -> Self
    where
        F: Fn(&RunContext) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            op: Arc::new(op),
        }
    }
}

#[async_trait]
impl Task for BlockingTask {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, ctx: &RunContext) -> Result<()> {
        let op = Arc::clone(&self.op);
        let ctx = ctx.clone();

        tokio::task::spawn_blocking(move || op(&ctx))
            .await
            .map_err(|e| EtlError::Internal(format!("task {} aborted: {}", self.id, e)))?
    }
}
