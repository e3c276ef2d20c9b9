//! Task graph execution
//!
//! A [`TaskGraph`] holds task descriptors (id, operation, dependency set).
//! The [`Runner`] layers the graph topologically, runs each layer's tasks
//! concurrently, retries failed attempts per its [`RetryPolicy`] and never
//! starts a task whose predecessors did not all succeed.
//!
//! ```text
//! TaskGraph::add_task(..)
//!   ↓
//! TaskGraph::stages()  → Vec<Vec<TaskId>>  (cycle / unknown dependency → error)
//!   ↓
//! Runner::run()        → RunReport
//! ```

mod graph;
mod report;
mod runner;
mod task;

pub use graph::TaskGraph;
pub use report::{RunReport, RunStatus, TaskOutcome, TaskStatus};
pub use runner::{RetryPolicy, Runner};
pub use task::{BlockingTask, RunContext, Task};
