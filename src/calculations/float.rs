use super::constraint::{ConstraintMode, Span, link_slack};
use crate::graph::TaskGraph;
use crate::ids::DependencyId;

/// Total float at or below this counts as zero.
pub const CRITICAL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloatAnalysis {
    pub total_float: Vec<f64>,
    pub free_float: Vec<f64>,
    pub critical: Vec<bool>,
    /// One entry per graph edge, in edge index order.
    pub dependency_criticality: Vec<(DependencyId, bool)>,
}

pub fn is_critical(total_float: f64) -> bool {
    total_float <= CRITICAL_EPSILON
}

pub fn classify(graph: &TaskGraph, early: &[Span], late: &[Span], mode: ConstraintMode) -> FloatAnalysis {
    let n = graph.node_count();
    let mut analysis = FloatAnalysis {
        total_float: Vec::with_capacity(n),
        free_float: Vec::with_capacity(n),
        critical: Vec::with_capacity(n),
        dependency_criticality: Vec::with_capacity(graph.edge_count()),
    };

    for ix in graph.graph.node_indices() {
        let own = early[ix.index()];
        let total = late[ix.index()].start - own.start;
        let free = graph
            .outgoing(ix)
            .map(|(succ, edge)| link_slack(mode, edge.kind, edge.lag, own, early[succ.index()]))
            .reduce(f64::min)
            .unwrap_or(total);

        analysis.total_float.push(total);
        analysis.free_float.push(free.max(0.0));
        analysis.critical.push(is_critical(total));
    }

    for edge in graph.graph.edge_indices() {
        let Some((from, to)) = graph.graph.edge_endpoints(edge) else {
            continue;
        };
        let critical = analysis.critical[from.index()] && analysis.critical[to.index()];
        analysis
            .dependency_criticality
            .push((graph.graph[edge].dependency_id, critical));
    }

    analysis
}
