pub mod cycle;
pub mod task_graph;

pub use cycle::{detect_cycle, ensure_acyclic};
pub use task_graph::{DependencyEdge, TaskGraph, TaskNode};
