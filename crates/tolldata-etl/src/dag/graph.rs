//! Directed acyclic graph of task descriptors

use std::collections::HashMap;
use std::sync::Arc;
use tolldata_common::{EtlError, Result};

use super::task::Task;

struct TaskNode {
    task: Arc<dyn Task>,
    deps: Vec<String>,
}

/// Tasks plus the dependency edges between them
pub struct TaskGraph {
    id: String,
    nodes: Vec<TaskNode>,
    index: HashMap<String, usize>,
}

impl TaskGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a task that may only start after every task in `deps` succeeded.
    ///
    /// Dependencies may name tasks added later; [`validate`](Self::validate)
    /// checks that they all exist.
    pub fn add_task(&mut self, task: Arc<dyn Task>, deps: &[&str]) -> Result<()> {
        let id = task.id().to_string();
        if self.index.contains_key(&id) {
            return Err(EtlError::Graph(format!("duplicate task id '{}'", id)));
        }

        let mut unique_deps: Vec<String> = Vec::with_capacity(deps.len());
        for dep in deps {
            if !unique_deps.iter().any(|d| d == dep) {
                unique_deps.push(dep.to_string());
            }
        }

        self.index.insert(id, self.nodes.len());
        self.nodes.push(TaskNode {
            task,
            deps: unique_deps,
        });
        Ok(())
    }

    pub fn task(&self, id: &str) -> Option<Arc<dyn Task>> {
        self.index.get(id).map(|&i| Arc::clone(&self.nodes[i].task))
    }

    pub fn dependencies(&self, id: &str) -> Option<&[String]> {
        self.index.get(id).map(|&i| self.nodes[i].deps.as_slice())
    }

    /// Task ids in registration order
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.task.id())
    }

    /// Check for unknown dependencies, self-dependencies and cycles
    pub fn validate(&self) -> Result<()> {
        self.stages().map(|_| ())
    }

    /// Topological layering of the graph.
    ///
    /// Every task appears in exactly one layer, after all of its dependencies.
    /// Within a layer tasks keep their registration order.
    pub fn stages(&self) -> Result<Vec<Vec<String>>> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            for dep in &node.deps {
                let &d = self.index.get(dep).ok_or_else(|| {
                    EtlError::Graph(format!(
                        "task '{}' depends on unknown task '{}'",
                        node.task.id(),
                        dep
                    ))
                })?;
                if d == i {
                    return Err(EtlError::Graph(format!(
                        "task '{}' depends on itself",
                        node.task.id()
                    )));
                }
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }

        let mut stages = Vec::new();
        let mut placed = 0;
        let mut ready: Vec<usize> = (0..self.nodes.len()).filter(|&i| in_degree[i] == 0).collect();

        while !ready.is_empty() {
            let mut next = Vec::new();
            for &i in &ready {
                for &child in &dependents[i] {
                    in_degree[child] -= 1;
                    if in_degree[child] == 0 {
                        next.push(child);
                    }
                }
            }
            next.sort_unstable();

            placed += ready.len();
            stages.push(
                ready
                    .iter()
                    .map(|&i| self.nodes[i].task.id().to_string())
                    .collect(),
            );
            ready = next;
        }

        if placed < self.nodes.len() {
            let cyclic: Vec<&str> = (0..self.nodes.len())
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.nodes[i].task.id())
                .collect();
            return Err(EtlError::Graph(format!(
                "dependency cycle among tasks: {}",
                cyclic.join(", ")
            )));
        }

        Ok(stages)
    }
}
