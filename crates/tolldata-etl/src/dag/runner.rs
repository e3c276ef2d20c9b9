//! Topological task runner with uniform retry policy

use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tolldata_common::Result;
use tracing::{error, info, info_span, warn, Instrument};

use super::graph::TaskGraph;
use super::report::{RunReport, TaskOutcome, TaskStatus};
use super::task::{RunContext, Task};

/// Number of retries after a failed attempt, and the pause before each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    /// One retry after five minutes
    fn default() -> Self {
        Self::new(1, Duration::from_secs(300))
    }
}

/// Executes a [`TaskGraph`] layer by layer
#[derive(Debug, Clone, Default)]
pub struct Runner {
    policy: RetryPolicy,
}

impl Runner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run every task of `graph`.
    ///
    /// Only an invalid graph is an `Err`; task failures are reported in the
    /// returned [`RunReport`].
    pub async fn run(&self, graph: &TaskGraph, ctx: &RunContext) -> Result<RunReport> {
        let stages = graph.stages()?;
        let started_at = Utc::now();

        info!(
            run_id = %ctx.run_id,
            dag_id = graph.id(),
            tasks = graph.len(),
            stages = stages.len(),
            "Starting run"
        );

        let mut statuses: HashMap<String, TaskStatus> = HashMap::new();
        let mut outcomes = Vec::with_capacity(graph.len());

        for (stage_no, stage) in stages.iter().enumerate() {
            let mut runnable = Vec::new();

            for task_id in stage {
                let deps = graph.dependencies(task_id).unwrap_or_default();
                let blocked: Vec<String> = deps
                    .iter()
                    .filter(|d| statuses.get(d.as_str()) != Some(&TaskStatus::Succeeded))
                    .cloned()
                    .collect();

                match graph.task(task_id) {
                    Some(task) if blocked.is_empty() => runnable.push(task),
                    _ => {
                        warn!(task_id = %task_id, blocked_by = ?blocked, "Skipping task");
                        statuses.insert(task_id.clone(), TaskStatus::Skipped);
                        outcomes.push(TaskOutcome::skipped(task_id, &blocked));
                    },
                }
            }

            info!(stage = stage_no + 1, tasks = runnable.len(), "Running stage");
            let results = join_all(runnable.iter().map(|task| self.run_task(task.as_ref(), ctx))).await;

            for outcome in results {
                statuses.insert(outcome.task_id.clone(), outcome.status);
                outcomes.push(outcome);
            }
        }

        let report = RunReport::new(ctx.run_id, graph.id(), started_at, outcomes);
        if report.succeeded() {
            info!(run_id = %ctx.run_id, "Run succeeded");
        } else {
            let failed: Vec<&str> = report
                .tasks_with_status(TaskStatus::Failed)
                .map(|t| t.task_id.as_str())
                .collect();
            error!(run_id = %ctx.run_id, failed = ?failed, "Run failed");
        }
        Ok(report)
    }

    /// Run one task with retries, regardless of graph position
    pub async fn run_task(&self, task: &dyn Task, ctx: &RunContext) -> TaskOutcome {
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let span = info_span!("task", task_id = task.id(), attempt);
            let result = task.run(ctx).instrument(span).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    info!(task_id = task.id(), attempt, elapsed_ms, "Task succeeded");
                    return TaskOutcome::succeeded(task.id(), attempt, elapsed_ms);
                },
                Err(err) => {
                    error!(
                        task_id = task.id(),
                        attempt,
                        max_attempts,
                        kind = %err.kind(),
                        error = %err,
                        "Task attempt failed"
                    );

                    if attempt >= max_attempts {
                        return TaskOutcome::failed(task.id(), attempt, elapsed_ms, &err);
                    }

                    warn!(
                        task_id = task.id(),
                        delay_secs = self.policy.delay.as_secs(),
                        "Retrying task"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                },
            }
        }
    }
}
