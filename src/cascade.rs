//! Date propagation after a single task's planned dates change.

use crate::calculations::constraint::cascade_start;
use crate::config::EngineConfig;
use crate::error::{CpmError, Result};
use crate::graph::{TaskGraph, detect_cycle};
use crate::ids::TaskId;
use crate::schedule::ProjectSchedule;
use chrono::{NaiveDate, TimeDelta};
use petgraph::graph::NodeIndex;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use tracing::{debug, error};

/// Move `task_id` to `[new_start, new_end]` and push its successors.
///
/// Successors reachable through eligible links are visited once each in
/// topological order. A successor is only re-evaluated when one of its
/// predecessors moved during this call; it then takes the latest start any of
/// its incoming links demands while keeping its own span. Returns the ids of
/// the successors that moved, in the order they moved. The edited task's
/// `duration_days` becomes the length of its new range, and containers cannot
/// be edited.
pub fn propagate(
    schedule: &mut ProjectSchedule,
    task_id: TaskId,
    new_start: NaiveDate,
    new_end: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<TaskId>> {
    if new_start > new_end {
        return Err(CpmError::InvalidDates {
            task_id,
            message: format!("start {new_start} is after end {new_end}"),
        });
    }
    let containers = schedule.container_ids();
    let task = schedule
        .task_mut(task_id)
        .ok_or(CpmError::TaskNotFound(task_id))?;
    if containers.contains(&task_id) {
        return Err(CpmError::InvalidDates {
            task_id,
            message: "container dates follow their children and cannot be set directly".into(),
        });
    }
    task.planned_start = Some(new_start);
    task.planned_end = Some(new_end);
    task.duration_days = (new_end - new_start).num_days();

    if !schedule.metadata.auto_scheduling_enabled {
        debug!(task_id = %task_id, "auto-scheduling disabled, successors left alone");
        return Ok(Vec::new());
    }

    let graph = TaskGraph::load(schedule);
    let Some(origin) = graph.index_of(task_id) else {
        return Ok(Vec::new());
    };
    let order = reachable_in_topological_order(&graph, origin)?;

    let index = schedule.task_index();
    let mut dirty: HashSet<NodeIndex> = HashSet::from([origin]);
    let mut shifted = Vec::new();
    let mut steps = 0usize;

    for ix in order.into_iter().skip(1) {
        if !graph.incoming(ix).any(|(pred, _)| dirty.contains(&pred)) {
            continue;
        }
        steps += 1;
        if steps > config.cascade_step_limit {
            return Err(CpmError::CascadeLimitExceeded {
                origin: task_id,
                limit: config.cascade_step_limit,
            });
        }

        let succ_id = graph.task_id(ix);
        let succ = &schedule.tasks[index[&succ_id]];
        let span = succ.span_days();

        let mut required: Option<NaiveDate> = None;
        for (pred, edge) in graph.incoming(ix) {
            let pred_task = &schedule.tasks[index[&graph.task_id(pred)]];
            let (Some(pred_start), Some(pred_end)) = (pred_task.planned_start, pred_task.planned_end)
            else {
                continue;
            };
            let bound = cascade_start(
                config.constraint_mode,
                edge.kind,
                edge.lag.round() as i64,
                pred_start,
                pred_end,
                span,
            )
            .ok_or_else(|| out_of_range(succ_id))?;
            required = Some(required.map_or(bound, |current| current.max(bound)));
        }

        let Some(start) = required else {
            continue;
        };
        if succ.planned_start == Some(start) {
            continue;
        }
        let end = TimeDelta::try_days(span)
            .and_then(|delta| start.checked_add_signed(delta))
            .ok_or_else(|| out_of_range(succ_id))?;

        let succ = &mut schedule.tasks[index[&succ_id]];
        debug!(task_id = %succ_id, from = ?succ.planned_start, to = %start, "cascade shifted task");
        succ.planned_start = Some(start);
        succ.planned_end = Some(end);
        dirty.insert(ix);
        shifted.push(succ_id);
    }

    Ok(shifted)
}

fn out_of_range(task_id: TaskId) -> CpmError {
    CpmError::InvalidDates {
        task_id,
        message: "shifted date falls outside the supported calendar range".into(),
    }
}

/// Kahn's algorithm over the part of the graph reachable from `origin`,
/// smallest task id first among ready nodes. `origin` comes first.
fn reachable_in_topological_order(graph: &TaskGraph, origin: NodeIndex) -> Result<Vec<NodeIndex>> {
    let mut reachable = HashSet::from([origin]);
    let mut frontier = VecDeque::from([origin]);
    while let Some(ix) = frontier.pop_front() {
        for (succ, _) in graph.outgoing(ix) {
            if reachable.insert(succ) {
                frontier.push_back(succ);
            }
        }
    }

    let mut in_degree: HashMap<NodeIndex, usize> = reachable.iter().map(|ix| (*ix, 0)).collect();
    for ix in &reachable {
        for (succ, _) in graph.outgoing(*ix) {
            if let Some(degree) = in_degree.get_mut(&succ) {
                *degree += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(TaskId, usize)>> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(ix, _)| Reverse((graph.task_id(*ix), ix.index())))
        .collect();
    let mut order = Vec::with_capacity(reachable.len());
    while let Some(Reverse((_, raw))) = ready.pop() {
        let ix = NodeIndex::new(raw);
        order.push(ix);
        for (succ, _) in graph.outgoing(ix) {
            if let Some(degree) = in_degree.get_mut(&succ) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse((graph.task_id(succ), succ.index())));
                }
            }
        }
    }

    if order.len() < reachable.len() {
        let path = detect_cycle(graph).unwrap_or_else(|| vec![graph.task_id(origin)]);
        error!(task_id = %path[0], "cycle among cascade successors");
        return Err(CpmError::CyclicDependency {
            task_id: path[0],
            path,
        });
    }
    Ok(order)
}
