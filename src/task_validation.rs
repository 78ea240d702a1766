use crate::dependency::TaskDependency;
use crate::ids::ScheduleId;
use crate::schedule::ProjectSchedule;
use crate::task::ScheduleTask;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn validate_task(task: &ScheduleTask, schedule_id: ScheduleId) -> Result<(), TaskValidationError> {
    if task.schedule_id != schedule_id {
        return Err(TaskValidationError::new(format!(
            "task {} belongs to schedule {} but was found in schedule {}",
            task.id, task.schedule_id, schedule_id
        )));
    }

    if task.duration_days < 0 {
        return Err(TaskValidationError::new(format!(
            "task {} has negative duration {}",
            task.id, task.duration_days
        )));
    }

    if task.parent_id == Some(task.id) {
        return Err(TaskValidationError::new(format!(
            "task {} cannot be its own parent",
            task.id
        )));
    }

    if let (Some(start), Some(end)) = (task.planned_start, task.planned_end) {
        if start > end {
            return Err(TaskValidationError::new(format!(
                "task {} has planned_start {} after planned_end {}",
                task.id, start, end
            )));
        }
    }

    Ok(())
}

pub fn validate_dependency(dependency: &TaskDependency) -> Result<(), TaskValidationError> {
    if !dependency.lag_days.is_finite() {
        return Err(TaskValidationError::new(format!(
            "dependency {} has non-finite lag {}",
            dependency.id, dependency.lag_days
        )));
    }
    Ok(())
}

pub fn validate_schedule(schedule: &ProjectSchedule) -> Result<(), TaskValidationError> {
    let mut seen_tasks = HashSet::with_capacity(schedule.tasks.len());
    for task in &schedule.tasks {
        if !seen_tasks.insert(task.id) {
            return Err(TaskValidationError::new(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        validate_task(task, schedule.id)?;
    }

    let mut seen_dependencies = HashSet::with_capacity(schedule.dependencies.len());
    for dependency in &schedule.dependencies {
        if !seen_dependencies.insert(dependency.id) {
            return Err(TaskValidationError::new(format!(
                "duplicate dependency id {}",
                dependency.id
            )));
        }
        validate_dependency(dependency)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{DependencyId, TaskId};
    use chrono::NaiveDate;

    fn schedule() -> ProjectSchedule {
        let sid = ScheduleId(1);
        let mut schedule = ProjectSchedule::new(sid, "Validation");
        schedule.upsert_task(ScheduleTask::new(TaskId(1), sid, "A", 2));
        schedule.upsert_task(ScheduleTask::new(TaskId(2), sid, "B", 3));
        schedule
    }

    #[test]
    fn rejects_negative_duration() {
        let mut s = schedule();
        s.tasks[0].duration_days = -1;
        let err = validate_schedule(&s).unwrap_err();
        assert!(err.message().contains("negative duration"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut s = schedule();
        s.tasks.push(s.tasks[0].clone());
        assert!(validate_schedule(&s).unwrap_err().message().contains("duplicate task id 1"));

        let mut s = schedule();
        let dep = TaskDependency::finish_to_start(DependencyId(9), TaskId(1), TaskId(2));
        s.dependencies.push(dep.clone());
        s.dependencies.push(dep);
        assert!(validate_schedule(&s).unwrap_err().message().contains("duplicate dependency id 9"));
    }

    #[test]
    fn rejects_non_finite_lag_and_inverted_dates() {
        let mut s = schedule();
        s.dependencies.push(
            TaskDependency::finish_to_start(DependencyId(1), TaskId(1), TaskId(2)).with_lag(f64::NAN),
        );
        assert!(validate_schedule(&s).is_err());

        let mut s = schedule();
        s.tasks[0].planned_start = NaiveDate::from_ymd_opt(2025, 2, 1);
        s.tasks[0].planned_end = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert!(validate_schedule(&s).unwrap_err().message().contains("after planned_end"));
    }

    #[test]
    fn self_dependencies_are_left_to_cycle_detection() {
        let mut s = schedule();
        s.dependencies
            .push(TaskDependency::finish_to_start(DependencyId(1), TaskId(1), TaskId(1)));
        assert!(validate_schedule(&s).is_ok());
    }
}
