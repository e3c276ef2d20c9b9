//! Per-run execution report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tolldata_common::{EtlError, ErrorKind, Result};
use uuid::Uuid;

/// Final state of one task in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Succeeded,
    /// Every attempt failed
    Failed,
    /// Not started because a predecessor did not succeed
    Skipped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    /// Attempts made, zero for skipped tasks
    pub attempts: u32,
    pub duration_ms: u64,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
}

impl TaskOutcome {
    pub(crate) fn succeeded(task_id: &str, attempts: u32, duration_ms: u64) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Succeeded,
            attempts,
            duration_ms,
            error_kind: None,
            error: None,
        }
    }

    pub(crate) fn failed(task_id: &str, attempts: u32, duration_ms: u64, err: &EtlError) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Failed,
            attempts,
            duration_ms,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
        }
    }

    pub(crate) fn skipped(task_id: &str, blocked_by: &[String]) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Skipped,
            attempts: 0,
            duration_ms: 0,
            error_kind: None,
            error: Some(format!("upstream not successful: {}", blocked_by.join(", "))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Summary of one graph execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub dag_id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outcomes in execution order
    pub tasks: Vec<TaskOutcome>,
}

impl RunReport {
    pub(crate) fn new(
        run_id: Uuid,
        dag_id: &str,
        started_at: DateTime<Utc>,
        tasks: Vec<TaskOutcome>,
    ) -> Self {
        let status = if tasks.iter().all(|t| t.status == TaskStatus::Succeeded) {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };

        Self {
            run_id,
            dag_id: dag_id.to_string(),
            status,
            started_at,
            finished_at: Utc::now(),
            tasks,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn outcome(&self, task_id: &str) -> Option<&TaskOutcome> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> impl Iterator<Item = &TaskOutcome> {
        self.tasks.iter().filter(move |t| t.status == status)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| EtlError::io(path, e))
    }
}
