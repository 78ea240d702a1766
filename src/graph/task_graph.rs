use crate::dependency::DependencyType;
use crate::ids::{DependencyId, TaskId};
use crate::schedule::ProjectSchedule;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub task_id: TaskId,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEdge {
    pub dependency_id: DependencyId,
    pub kind: DependencyType,
    pub lag: f64,
}

/// Precedence network of a schedule's work tasks.
///
/// Nodes are added in task id order and edges in dependency id order.
/// Containers never become nodes. Active, valid dependencies whose endpoints
/// are not both work tasks of the schedule are recorded in `orphaned` instead
/// of becoming edges.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    pub graph: DiGraph<TaskNode, DependencyEdge>,
    pub id_to_index: HashMap<TaskId, NodeIndex>,
    pub orphaned: Vec<DependencyId>,
}

impl TaskGraph {
    pub fn load(schedule: &ProjectSchedule) -> Self {
        let containers = schedule.container_ids();

        let mut work: Vec<_> = schedule
            .tasks
            .iter()
            .filter(|task| !containers.contains(&task.id))
            .collect();
        work.sort_by_key(|task| task.id);

        let mut graph = DiGraph::with_capacity(work.len(), schedule.dependencies.len());
        let mut id_to_index = HashMap::with_capacity(work.len());
        for task in work {
            let ix = graph.add_node(TaskNode {
                task_id: task.id,
                duration: task.duration_days.max(0) as f64,
            });
            id_to_index.insert(task.id, ix);
        }

        let mut enabled: Vec<_> = schedule
            .dependencies
            .iter()
            .filter(|dep| dep.is_enabled())
            .collect();
        enabled.sort_by_key(|dep| dep.id);

        let mut orphaned = Vec::new();
        for dependency in enabled {
            let endpoints = (
                id_to_index.get(&dependency.predecessor_id),
                id_to_index.get(&dependency.successor_id),
            );
            match endpoints {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(
                        from,
                        to,
                        DependencyEdge {
                            dependency_id: dependency.id,
                            kind: dependency.dependency_type,
                            lag: dependency.lag_days,
                        },
                    );
                }
                _ => {
                    warn!(
                        schedule_id = %schedule.id,
                        dependency_id = %dependency.id,
                        predecessor = %dependency.predecessor_id,
                        successor = %dependency.successor_id,
                        "skipping dependency without two work-task endpoints"
                    );
                    orphaned.push(dependency.id);
                }
            }
        }

        Self {
            graph,
            id_to_index,
            orphaned,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn index_of(&self, task_id: TaskId) -> Option<NodeIndex> {
        self.id_to_index.get(&task_id).copied()
    }

    pub fn task_id(&self, ix: NodeIndex) -> TaskId {
        self.graph[ix].task_id
    }

    pub fn duration(&self, ix: NodeIndex) -> f64 {
        self.graph[ix].duration
    }

    /// Predecessor nodes of `ix` together with the linking edge.
    pub fn incoming(&self, ix: NodeIndex) -> impl Iterator<Item = (NodeIndex, &DependencyEdge)> {
        self.graph
            .edges_directed(ix, Direction::Incoming)
            .map(|edge| (edge.source(), edge.weight()))
    }

    /// Successor nodes of `ix` together with the linking edge.
    pub fn outgoing(&self, ix: NodeIndex) -> impl Iterator<Item = (NodeIndex, &DependencyEdge)> {
        self.graph
            .edges_directed(ix, Direction::Outgoing)
            .map(|edge| (edge.target(), edge.weight()))
    }
}
