//! Circular dependency detection.
//!
//! Depth-first search over "depends on" edges with an explicit path stack.
//! Reaching a node that is still on the path closes a cycle; the closed walk
//! from that node to the end of the path is recorded in canonical rotation.
//! Nodes are never entered twice, so total work is O(V + E) plus the cost of
//! extracting each cycle.

use rustc_hash::FxHashSet;

use crate::graph::TaskGraph;
use crate::interner::NodeIndex;
use crate::models::{Cycle, Task};
use crate::{log_changes, log_debug};

/// Find dependency cycles in a batch.
///
/// Returns canonical, duplicate-free cycles in discovery order. Roots are
/// tried in input order and neighbours in dependency-list order, so the
/// result is deterministic for a given batch.
pub fn detect_cycles(tasks: &[Task], verbosity: u8) -> Vec<Cycle> {
    let graph = TaskGraph::build(tasks);
    let cycles = find_cycles(&graph, verbosity);
    if !cycles.is_empty() {
        log_changes!(
            verbosity,
            "Detected {} dependency cycle(s) among {} tasks",
            cycles.len(),
            graph.len()
        );
    }
    cycles
}

/// Run cycle detection on an already-built graph.
pub fn find_cycles(graph: &TaskGraph, verbosity: u8) -> Vec<Cycle> {
    let n = graph.len();
    let mut visited = vec![false; n];
    // Position of each node on the current path, if it is on it.
    let mut path_pos: Vec<Option<usize>> = vec![None; n];
    let mut path: Vec<NodeIndex> = Vec::new();
    // (node, next neighbour to examine)
    let mut frames: Vec<(NodeIndex, usize)> = Vec::new();

    let mut cycles = Vec::new();
    let mut seen: FxHashSet<Cycle> = FxHashSet::default();

    for root in 0..n as NodeIndex {
        if visited[root as usize] {
            continue;
        }
        log_debug!(verbosity, "DFS root {}", graph.task_id(root));

        visited[root as usize] = true;
        path_pos[root as usize] = Some(path.len());
        path.push(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let Some(&neighbour) = graph.depends_on(node).get(next) else {
                frames.pop();
                path.pop();
                path_pos[node as usize] = None;
                continue;
            };
            frame.1 += 1;

            if let Some(start) = path_pos[neighbour as usize] {
                let walk = path[start..]
                    .iter()
                    .chain(std::iter::once(&neighbour))
                    .map(|&node| graph.task_id(node))
                    .collect();
                let cycle = Cycle::canonical(walk);
                log_debug!(verbosity, "Back edge closes cycle {:?}", cycle.ids());
                if seen.insert(cycle.clone()) {
                    cycles.push(cycle);
                }
            } else if !visited[neighbour as usize] {
                visited[neighbour as usize] = true;
                path_pos[neighbour as usize] = Some(path.len());
                path.push(neighbour);
                frames.push((neighbour, 0));
            }
        }
    }

    cycles
}
