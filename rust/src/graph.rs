//! Dependency graph over a task batch.
//!
//! [`TaskGraph`] is the indexed structure the cycle detector and scorer walk.
//! [`GraphView`] is the flattened node/edge listing handed to visualization
//! hosts, with cycle membership already marked.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::interner::{NodeIndex, TaskIndex};
use crate::models::{Cycle, Task, TaskId};

/// Indexed dependency graph. Nodes are the batch's tasks in input order;
/// references to IDs outside the batch are recorded separately.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    index: TaskIndex,
    /// Outgoing "depends on" edges per node, in dependency-list order.
    depends_on: Vec<Vec<NodeIndex>>,
    /// (dependent, missing dependency) pairs for IDs not in the batch.
    dangling: Vec<(TaskId, TaskId)>,
}

impl TaskGraph {
    pub fn build(tasks: &[Task]) -> Self {
        let index = TaskIndex::from_ids(tasks.iter().map(|t| t.id));
        let mut depends_on: Vec<Vec<NodeIndex>> = vec![Vec::new(); index.len()];
        let mut dangling = Vec::new();

        for task in tasks {
            let Some(node) = index.get(task.id) else {
                continue;
            };
            for &dep in &task.dependencies {
                match index.get(dep) {
                    Some(dep_node) => depends_on[node as usize].push(dep_node),
                    None => dangling.push((task.id, dep)),
                }
            }
        }

        Self {
            index,
            depends_on,
            dangling,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn depends_on(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.depends_on[node as usize]
    }

    #[inline]
    pub fn task_id(&self, node: NodeIndex) -> TaskId {
        // Nodes only come from this graph's own index.
        self.index.resolve(node).unwrap_or_default()
    }

    pub fn node(&self, id: TaskId) -> Option<NodeIndex> {
        self.index.get(id)
    }

    pub fn dangling(&self) -> &[(TaskId, TaskId)] {
        &self.dangling
    }

    /// Number of *other* batch tasks depending on each node (in-degree, self-loops excluded).
    pub fn dependent_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.len()];
        for (node, deps) in self.depends_on.iter().enumerate() {
            for &dep in deps {
                if dep as usize != node {
                    counts[dep as usize] += 1;
                }
            }
        }
        counts
    }
}

/// A node in the visualization listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: TaskId,
    /// `None` for placeholder nodes standing in for missing dependencies.
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    /// Referenced as a dependency but absent from the batch.
    pub missing: bool,
    pub on_cycle: bool,
}

/// An edge `from` (dependency) -> `to` (dependent).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: TaskId,
    pub to: TaskId,
    pub on_cycle: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub cycles: Vec<Cycle>,
}

/// Flatten a batch and its reported cycles into nodes and edges.
///
/// Batch tasks come first in input order, followed by one placeholder per
/// missing dependency ID in order of first reference.
pub fn graph_view(tasks: &[Task], cycles: &[Cycle]) -> GraphView {
    let known: FxHashSet<TaskId> = tasks.iter().map(|t| t.id).collect();
    let on_cycle = |id: TaskId| cycles.iter().any(|c| c.contains(id));

    let mut nodes: Vec<GraphNode> = tasks
        .iter()
        .map(|t| GraphNode {
            id: t.id,
            title: Some(t.title.clone()),
            due_date: Some(t.due_date),
            estimated_hours: Some(t.estimated_hours),
            missing: false,
            on_cycle: on_cycle(t.id),
        })
        .collect();

    let mut missing: FxHashSet<TaskId> = FxHashSet::default();
    let mut edges = Vec::new();
    for task in tasks {
        for &dep in &task.dependencies {
            if !known.contains(&dep) && missing.insert(dep) {
                nodes.push(GraphNode {
                    id: dep,
                    title: None,
                    due_date: None,
                    estimated_hours: None,
                    missing: true,
                    on_cycle: false,
                });
            }
            edges.push(GraphEdge {
                from: dep,
                to: task.id,
                on_cycle: cycles.iter().any(|c| c.has_step(task.id, dep)),
            });
        }
    }

    GraphView {
        nodes,
        edges,
        cycles: cycles.to_vec(),
    }
}
