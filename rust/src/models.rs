//! Core data types for task analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task identifier (positive integer, unique within a batch).
pub type TaskId = u64;

/// A task record as received from the host, before validation.
///
/// Every field is optional and untyped; coercion happens in
/// [`crate::validation`] and nowhere else.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub due_date: Option<Value>,
    #[serde(default)]
    pub estimated_hours: Option<Value>,
    #[serde(default)]
    pub importance: Option<Value>,
    #[serde(default)]
    pub dependencies: Option<Value>,
}

/// A validated task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub due_date: NaiveDate,
    pub estimated_hours: f64,
    pub importance: u8,
    /// Tasks that must complete before this one (deduplicated, input order).
    pub dependencies: Vec<TaskId>,
}

/// A task with its computed priority score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredTask {
    #[serde(flatten)]
    pub task: Task,
    /// Final score, rounded to 2 decimals.
    pub score: f64,
    /// Number of other tasks in the batch that list this task as a dependency.
    pub dependency_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ScoredTask {
    pub fn id(&self) -> TaskId {
        self.task.id
    }
}

/// A closed dependency walk `[a, b, ..., a]` in canonical rotation.
///
/// Consecutive IDs are "depends on" steps: `a` depends on `b`, and so on back to `a`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(Vec<TaskId>);

impl Cycle {
    /// Build a cycle from a closed walk, rotating it to start at its smallest ID.
    ///
    /// The walk must end with the ID it starts with. Walks of length 0 or 1
    /// are returned unchanged.
    pub fn canonical(walk: Vec<TaskId>) -> Self {
        if walk.len() < 2 {
            return Self(walk);
        }
        let body = &walk[..walk.len() - 1];
        let min_pos = body
            .iter()
            .enumerate()
            .min_by_key(|&(_, id)| *id)
            .map(|(pos, _)| pos)
            .unwrap_or(0);

        let mut ids = Vec::with_capacity(walk.len());
        ids.extend_from_slice(&body[min_pos..]);
        ids.extend_from_slice(&body[..min_pos]);
        ids.push(body[min_pos]);
        Self(ids)
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.0
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.0.contains(&id)
    }

    /// Whether `dependent` depends on `dependency` along this cycle.
    pub fn has_step(&self, dependent: TaskId, dependency: TaskId) -> bool {
        self.0
            .windows(2)
            .any(|pair| pair[0] == dependent && pair[1] == dependency)
    }

    pub fn into_ids(self) -> Vec<TaskId> {
        self.0
    }
}
