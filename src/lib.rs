//! Critical Path Method scheduling for hierarchical task networks.
//!
//! [`CpmEngine`] is the entry point: it loads a [`ProjectSchedule`] from a
//! [`ScheduleRepository`], computes early/late dates, float and the critical
//! path, propagates single-task date edits to successors and keeps container
//! tasks and WBS codes consistent with the task tree.

pub mod calculations;
pub mod cascade;
pub mod clock;
pub mod config;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod ids;
pub mod locks;
#[cfg(feature = "cli")]
pub mod logging;
pub mod metadata;
pub mod persistence;
#[cfg(feature = "report")]
pub mod report;
pub mod schedule;
pub mod task;
pub mod task_validation;
pub mod writer;

pub use calculations::constraint::ConstraintMode;
pub use calculations::{CpmResult, TaskTiming, analyze, analyze_batch};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use dependency::{DependencyType, TaskDependency, ValidationStatus};
pub use engine::{CascadeOutcome, CpmEngine};
pub use error::{CpmError, Result};
pub use ids::{DependencyId, ScheduleId, TaskId};
pub use metadata::ScheduleMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::SqliteScheduleStore;
pub use persistence::{InMemoryScheduleStore, PersistenceError, ScheduleRepository};
pub use schedule::{CalculationOutcome, CpmStatistics, ProjectSchedule};
pub use task::{ScheduleTask, TaskType};
pub use writer::{CpmUpdate, TaskDateUpdate, WbsAssignment};
