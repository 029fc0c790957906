//! Dense node indexing for task IDs.
//!
//! Maps sparse task IDs to contiguous integers so graph passes can use
//! plain vectors instead of hash lookups.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Dense node index (u32 for compact storage and fast hashing).
pub type NodeIndex = u32;

/// Bidirectional map between task IDs and dense node indices.
#[derive(Debug, Clone)]
pub struct TaskIndex {
    to_node: FxHashMap<TaskId, NodeIndex>,
    from_node: Vec<TaskId>,
}

impl TaskIndex {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_node: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_node: Vec::with_capacity(capacity),
        }
    }

    /// Build an index over IDs in iteration order.
    pub fn from_ids(ids: impl IntoIterator<Item = TaskId>) -> Self {
        let ids = ids.into_iter();
        let mut index = Self::with_capacity(ids.size_hint().0);
        for id in ids {
            index.insert(id);
        }
        index
    }

    /// Insert an ID, returning its node index.
    /// If already present, returns the existing index.
    pub fn insert(&mut self, id: TaskId) -> NodeIndex {
        if let Some(&node) = self.to_node.get(&id) {
            return node;
        }
        let node = self.from_node.len() as NodeIndex;
        self.from_node.push(id);
        self.to_node.insert(id, node);
        node
    }

    #[inline]
    pub fn get(&self, id: TaskId) -> Option<NodeIndex> {
        self.to_node.get(&id).copied()
    }

    #[inline]
    pub fn resolve(&self, node: NodeIndex) -> Option<TaskId> {
        self.from_node.get(node as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.from_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_node.is_empty()
    }
}

impl Default for TaskIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
