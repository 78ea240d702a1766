use super::constraint::{ConstraintMode, Span, forward_start};
use crate::error::{CpmError, Result};
use crate::graph::{TaskGraph, detect_cycle};
use petgraph::graph::NodeIndex;
use std::collections::VecDeque;
use tracing::debug;

/// Early dates for every node, indexed by `NodeIndex::index()`.
///
/// Nodes move from the queue to `processed` once all of their predecessors
/// are done; a node seen too early goes to the back of the queue. A full lap
/// without progress means the remaining nodes sit on a cycle.
pub fn forward_pass(graph: &TaskGraph, mode: ConstraintMode) -> Result<Vec<Span>> {
    let n = graph.node_count();
    let mut early = vec![Span::default(); n];
    let mut processed = vec![false; n];
    let mut queue: VecDeque<NodeIndex> = graph.graph.node_indices().collect();
    let mut stalled = 0usize;

    while let Some(ix) = queue.pop_front() {
        let ready = graph.incoming(ix).all(|(pred, _)| processed[pred.index()]);
        if !ready {
            queue.push_back(ix);
            stalled += 1;
            if stalled >= queue.len() {
                return Err(stall_error(graph, ix));
            }
            continue;
        }
        stalled = 0;

        let duration = graph.duration(ix);
        let mut start = graph
            .incoming(ix)
            .map(|(pred, edge)| forward_start(mode, edge.kind, edge.lag, early[pred.index()], duration))
            .reduce(f64::max)
            .unwrap_or(0.0);
        if mode.clamps() {
            start = start.max(0.0);
        }

        early[ix.index()] = Span::new(start, start + duration);
        processed[ix.index()] = true;
    }

    debug!(nodes = n, "forward pass complete");
    Ok(early)
}

pub(crate) fn stall_error(graph: &TaskGraph, at: NodeIndex) -> CpmError {
    let path = detect_cycle(graph).unwrap_or_else(|| vec![graph.task_id(at)]);
    CpmError::CyclicDependency {
        task_id: path[0],
        path,
    }
}
