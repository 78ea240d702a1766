//! Whole-network CPM analysis over a schedule snapshot.

pub mod backward_pass;
pub mod constraint;
pub mod float;
pub mod forward_pass;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::{TaskGraph, ensure_acyclic};
use crate::ids::{DependencyId, ScheduleId, TaskId};
use crate::schedule::{CpmStatistics, ProjectSchedule};
use crate::task_validation::validate_schedule;
use constraint::ConstraintMode;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

pub use backward_pass::{backward_pass, project_finish};
pub use constraint::Span;
pub use float::{CRITICAL_EPSILON, FloatAnalysis, classify};
pub use forward_pass::forward_pass;

/// Computed dates of one work task, in day offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTiming {
    pub task_id: TaskId,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
    pub free_float: f64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CpmResult {
    /// Ordered by task id.
    pub timings: Vec<TaskTiming>,
    pub dependency_criticality: Vec<(DependencyId, bool)>,
    pub project_duration: f64,
    pub orphaned_dependencies: Vec<DependencyId>,
    /// Dependencies that took part in the calculation.
    pub dependency_count: usize,
}

impl CpmResult {
    pub fn timing(&self, task_id: TaskId) -> Option<&TaskTiming> {
        self.timings
            .binary_search_by_key(&task_id, |timing| timing.task_id)
            .ok()
            .map(|idx| &self.timings[idx])
    }

    /// Critical tasks ordered by early start, ties broken by id.
    pub fn critical_task_ids(&self) -> Vec<TaskId> {
        let mut critical: Vec<&TaskTiming> =
            self.timings.iter().filter(|timing| timing.is_critical).collect();
        critical.sort_by(|a, b| {
            a.early_start
                .partial_cmp(&b.early_start)
                .unwrap_or(Ordering::Equal)
                .then(a.task_id.cmp(&b.task_id))
        });
        critical.into_iter().map(|timing| timing.task_id).collect()
    }

    pub fn statistics(&self) -> CpmStatistics {
        let critical = self.timings.iter().filter(|timing| timing.is_critical).count();
        CpmStatistics::new(
            self.timings.len(),
            critical,
            self.project_duration,
            self.dependency_count,
        )
    }
}

/// Validate, load, check for cycles, then run both passes and classify.
pub fn analyze(schedule: &ProjectSchedule, config: &EngineConfig) -> Result<CpmResult> {
    validate_schedule(schedule)?;
    let graph = TaskGraph::load(schedule);
    ensure_acyclic(&graph)?;
    analyze_graph(&graph, config.constraint_mode)
}

/// Runs the passes on an already loaded graph. A cycle still surfaces as an
/// error from the forward pass.
pub fn analyze_graph(graph: &TaskGraph, mode: ConstraintMode) -> Result<CpmResult> {
    if graph.is_empty() {
        debug!("empty network");
        return Ok(CpmResult {
            orphaned_dependencies: graph.orphaned.clone(),
            ..CpmResult::default()
        });
    }

    let early = forward_pass(graph, mode)?;
    let finish = project_finish(&early);
    let late = backward_pass(graph, mode, finish)?;
    let floats = classify(graph, &early, &late, mode);

    let timings = graph
        .graph
        .node_indices()
        .map(|ix| {
            let i = ix.index();
            TaskTiming {
                task_id: graph.task_id(ix),
                early_start: early[i].start,
                early_finish: early[i].finish,
                late_start: late[i].start,
                late_finish: late[i].finish,
                total_float: floats.total_float[i],
                free_float: floats.free_float[i],
                is_critical: floats.critical[i],
            }
        })
        .collect();

    Ok(CpmResult {
        timings,
        dependency_criticality: floats.dependency_criticality,
        project_duration: finish,
        orphaned_dependencies: graph.orphaned.clone(),
        dependency_count: graph.edge_count(),
    })
}

/// Analyze independent schedules on the rayon pool.
pub fn analyze_batch(
    schedules: &[ProjectSchedule],
    config: &EngineConfig,
) -> Vec<(ScheduleId, Result<CpmResult>)> {
    schedules
        .par_iter()
        .map(|schedule| (schedule.id, analyze(schedule, config)))
        .collect()
}
