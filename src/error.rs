//! Engine-level errors.

use crate::ids::{ScheduleId, TaskId};
use crate::persistence::PersistenceError;
use crate::task_validation::TaskValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CpmError {
    #[error("circular dependency detected at task {task_id} ({})", render_path(.path))]
    CyclicDependency { task_id: TaskId, path: Vec<TaskId> },

    #[error("schedule {0} not found")]
    ScheduleNotFound(ScheduleId),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("invalid dates for task {task_id}: {message}")]
    InvalidDates { task_id: TaskId, message: String },

    #[error("cascade from task {origin} exceeded the limit of {limit} steps")]
    CascadeLimitExceeded { origin: TaskId, limit: usize },

    #[error("invalid schedule: {0}")]
    Validation(#[from] TaskValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, CpmError>;

fn render_path(path: &[TaskId]) -> String {
    if path.is_empty() {
        return "path unknown".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
