use super::constraint::{ConstraintMode, Span, backward_finish};
use super::forward_pass::stall_error;
use crate::error::Result;
use crate::graph::TaskGraph;
use petgraph::graph::NodeIndex;
use std::collections::VecDeque;
use tracing::debug;

/// Latest finish of any node in the early schedule.
pub fn project_finish(early: &[Span]) -> f64 {
    early.iter().map(|span| span.finish).reduce(f64::max).unwrap_or(0.0)
}

/// Late dates for every node, mirroring [`forward_pass`](super::forward_pass::forward_pass)
/// over successors. Sinks finish at `project_finish`.
pub fn backward_pass(graph: &TaskGraph, mode: ConstraintMode, project_finish: f64) -> Result<Vec<Span>> {
    let n = graph.node_count();
    let mut late = vec![Span::default(); n];
    let mut processed = vec![false; n];
    let mut queue: VecDeque<NodeIndex> = graph.graph.node_indices().rev().collect();
    let mut stalled = 0usize;

    while let Some(ix) = queue.pop_front() {
        let ready = graph.outgoing(ix).all(|(succ, _)| processed[succ.index()]);
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
        let mut finish = graph
            .outgoing(ix)
            .map(|(succ, edge)| backward_finish(mode, edge.kind, edge.lag, late[succ.index()], duration))
            .reduce(f64::min)
            .unwrap_or(project_finish);
        if mode.clamps() {
            finish = finish.min(project_finish);
        }

        late[ix.index()] = Span::new(finish - duration, finish);
        processed[ix.index()] = true;
    }

    debug!(nodes = n, project_finish, "backward pass complete");
    Ok(late)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::forward_pass::forward_pass;
    use crate::dependency::TaskDependency;
    use crate::ids::{DependencyId, ScheduleId, TaskId};
    use crate::schedule::ProjectSchedule;
    use crate::task::ScheduleTask;

    #[test]
    fn sinks_finish_with_the_project() {
        let sid = ScheduleId(1);
        let mut schedule = ProjectSchedule::new(sid, "Fork");
        schedule.upsert_task(ScheduleTask::new(TaskId(1), sid, "A", 3));
        schedule.upsert_task(ScheduleTask::new(TaskId(2), sid, "B", 4));
        schedule.upsert_task(ScheduleTask::new(TaskId(3), sid, "C", 1));
        schedule.upsert_dependency(TaskDependency::finish_to_start(DependencyId(1), TaskId(1), TaskId(2)));
        schedule.upsert_dependency(TaskDependency::finish_to_start(DependencyId(2), TaskId(1), TaskId(3)));

        let graph = TaskGraph::load(&schedule);
        let early = forward_pass(&graph, ConstraintMode::Exact).unwrap();
        let finish = project_finish(&early);
        assert_eq!(finish, 7.0);

        let late = backward_pass(&graph, ConstraintMode::Exact, finish).unwrap();
        assert_eq!(late[0], Span::new(0.0, 3.0));
        assert_eq!(late[1], Span::new(3.0, 7.0));
        assert_eq!(late[2], Span::new(6.0, 7.0));
    }

    #[test]
    fn empty_network_finishes_at_zero() {
        assert_eq!(project_finish(&[]), 0.0);
        let late = backward_pass(&TaskGraph::default(), ConstraintMode::Exact, 0.0).unwrap();
        assert!(late.is_empty());
    }
}
