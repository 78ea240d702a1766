//! Cycle detection over the precedence network.

use super::task_graph::TaskGraph;
use crate::error::{CpmError, Result};
use crate::ids::TaskId;
use petgraph::graph::NodeIndex;
use tracing::error;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first search for a back edge. Returns the cycle as a closed path of
/// task ids (first id repeated at the end) or `None` for a DAG.
///
/// Roots and successors are visited in task id order so the reported cycle is
/// stable across runs.
pub fn detect_cycle(graph: &TaskGraph) -> Option<Vec<TaskId>> {
    let n = graph.node_count();
    let mut marks = vec![Mark::Unvisited; n];

    let successors: Vec<Vec<NodeIndex>> = graph
        .graph
        .node_indices()
        .map(|ix| {
            let mut next: Vec<NodeIndex> = graph.outgoing(ix).map(|(to, _)| to).collect();
            next.sort_by_key(|to| graph.task_id(*to));
            next.dedup();
            next
        })
        .collect();

    let mut roots: Vec<NodeIndex> = graph.graph.node_indices().collect();
    roots.sort_by_key(|ix| graph.task_id(*ix));

    for root in roots {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }

        // (node, position of the next successor to explore)
        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        marks[root.index()] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let (node, cursor) = *top;
            top.1 += 1;
            let Some(&next) = successors[node.index()].get(cursor) else {
                marks[node.index()] = Mark::Done;
                stack.pop();
                continue;
            };

            match marks[next.index()] {
                Mark::Unvisited => {
                    marks[next.index()] = Mark::OnStack;
                    stack.push((next, 0));
                }
                Mark::OnStack => {
                    let start = stack
                        .iter()
                        .position(|(ix, _)| *ix == next)
                        .unwrap_or(0);
                    let mut path: Vec<TaskId> = stack[start..]
                        .iter()
                        .map(|(ix, _)| graph.task_id(*ix))
                        .collect();
                    path.push(graph.task_id(next));
                    return Some(path);
                }
                Mark::Done => {}
            }
        }
    }

    None
}

pub fn ensure_acyclic(graph: &TaskGraph) -> Result<()> {
    match detect_cycle(graph) {
        None => Ok(()),
        Some(path) => {
            let task_id = path[0];
            error!(task_id = %task_id, cycle = ?path, "dependency cycle detected");
            Err(CpmError::CyclicDependency { task_id, path })
        }
    }
}
