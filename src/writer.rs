//! Turns analysis results into field updates and applies them to a schedule.
//!
//! Every `apply_*` function checks all ids before touching anything, so a
//! rejected update leaves the schedule exactly as it was.

use crate::calculations::{CRITICAL_EPSILON, CpmResult};
use crate::error::{CpmError, Result};
use crate::ids::{DependencyId, ScheduleId, TaskId};
use crate::persistence::{PersistenceError, PersistenceResult};
use crate::schedule::ProjectSchedule;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// `reference + offset_days`, with fractional days kept to the millisecond.
pub fn offset_to_datetime(reference: DateTime<Utc>, offset_days: f64) -> Option<DateTime<Utc>> {
    let millis = (offset_days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    reference.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCpmFields {
    pub task_id: TaskId,
    pub early_start: DateTime<Utc>,
    pub early_finish: DateTime<Utc>,
    pub late_start: DateTime<Utc>,
    pub late_finish: DateTime<Utc>,
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyCpmFields {
    pub dependency_id: DependencyId,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpmUpdate {
    pub schedule_id: ScheduleId,
    pub tasks: Vec<TaskCpmFields>,
    pub dependencies: Vec<DependencyCpmFields>,
    pub critical_path_duration: f64,
    pub calculated_at: DateTime<Utc>,
}

impl CpmUpdate {
    pub fn from_result(
        schedule_id: ScheduleId,
        result: &CpmResult,
        reference: DateTime<Utc>,
    ) -> Result<Self> {
        let mut tasks = Vec::with_capacity(result.timings.len());
        for timing in &result.timings {
            let date = |offset: f64| {
                offset_to_datetime(reference, offset).ok_or_else(|| CpmError::InvalidDates {
                    task_id: timing.task_id,
                    message: format!("offset {offset} days is out of range"),
                })
            };
            tasks.push(TaskCpmFields {
                task_id: timing.task_id,
                early_start: date(timing.early_start)?,
                early_finish: date(timing.early_finish)?,
                late_start: date(timing.late_start)?,
                late_finish: date(timing.late_finish)?,
                total_float: whole_days(timing.total_float, timing.is_critical),
                free_float: whole_days(timing.free_float, timing.free_float <= CRITICAL_EPSILON),
                is_critical: timing.is_critical,
            });
        }

        let dependencies = result
            .dependency_criticality
            .iter()
            .map(|(dependency_id, is_critical)| DependencyCpmFields {
                dependency_id: *dependency_id,
                is_critical: *is_critical,
            })
            .collect();

        Ok(Self {
            schedule_id,
            tasks,
            dependencies,
            critical_path_duration: result.project_duration,
            calculated_at: reference,
        })
    }

    /// Overwrite every derived field of `schedule`. Tasks and dependencies the
    /// update does not mention end up cleared.
    pub fn apply_to(&self, schedule: &mut ProjectSchedule) -> PersistenceResult<()> {
        if schedule.id != self.schedule_id {
            return Err(PersistenceError::InvalidData(format!(
                "update for schedule {} applied to schedule {}",
                self.schedule_id, schedule.id
            )));
        }

        let task_index = schedule.task_index();
        for fields in &self.tasks {
            if !task_index.contains_key(&fields.task_id) {
                return Err(PersistenceError::InvalidData(format!(
                    "update references unknown task {}",
                    fields.task_id
                )));
            }
        }
        let dependency_index: HashMap<DependencyId, usize> = schedule
            .dependencies
            .iter()
            .enumerate()
            .map(|(idx, dep)| (dep.id, idx))
            .collect();
        for fields in &self.dependencies {
            if !dependency_index.contains_key(&fields.dependency_id) {
                return Err(PersistenceError::InvalidData(format!(
                    "update references unknown dependency {}",
                    fields.dependency_id
                )));
            }
        }

        for task in &mut schedule.tasks {
            task.clear_cpm_fields();
        }
        for dependency in &mut schedule.dependencies {
            dependency.is_critical = false;
        }

        for fields in &self.tasks {
            let task = &mut schedule.tasks[task_index[&fields.task_id]];
            task.early_start = Some(fields.early_start);
            task.early_finish = Some(fields.early_finish);
            task.late_start = Some(fields.late_start);
            task.late_finish = Some(fields.late_finish);
            task.total_float = Some(fields.total_float);
            task.free_float = Some(fields.free_float);
            task.is_critical = fields.is_critical;
        }
        for fields in &self.dependencies {
            schedule.dependencies[dependency_index[&fields.dependency_id]].is_critical =
                fields.is_critical;
        }

        schedule.metadata.critical_path_calculated = true;
        schedule.metadata.critical_path_duration = Some(self.critical_path_duration);
        schedule.metadata.calculated_at = Some(self.calculated_at);
        Ok(())
    }
}

/// Float stored as whole days. Zero exactly when `is_zero`, otherwise rounded
/// up so that any positive float stays at least one day.
fn whole_days(float: f64, is_zero: bool) -> i64 {
    if is_zero { 0 } else { (float.ceil() as i64).max(1) }
}

/// New planned dates for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDateUpdate {
    pub task_id: TaskId,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub duration_days: i64,
}

pub fn apply_task_dates(
    schedule: &mut ProjectSchedule,
    updates: &[TaskDateUpdate],
) -> PersistenceResult<()> {
    let task_index = schedule.task_index();
    ensure_known(&task_index, updates.iter().map(|update| update.task_id))?;
    for update in updates {
        let task = &mut schedule.tasks[task_index[&update.task_id]];
        task.planned_start = update.planned_start;
        task.planned_end = update.planned_end;
        task.duration_days = update.duration_days;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WbsAssignment {
    pub task_id: TaskId,
    pub wbs_code: Option<String>,
}

pub fn apply_wbs_codes(
    schedule: &mut ProjectSchedule,
    assignments: &[WbsAssignment],
) -> PersistenceResult<()> {
    let task_index = schedule.task_index();
    ensure_known(&task_index, assignments.iter().map(|assignment| assignment.task_id))?;
    for assignment in assignments {
        schedule.tasks[task_index[&assignment.task_id]].wbs_code = assignment.wbs_code.clone();
    }
    Ok(())
}

fn ensure_known(
    task_index: &HashMap<TaskId, usize>,
    ids: impl Iterator<Item = TaskId>,
) -> PersistenceResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !task_index.contains_key(&id) {
            return Err(PersistenceError::InvalidData(format!(
                "update references unknown task {id}"
            )));
        }
        if !seen.insert(id) {
            return Err(PersistenceError::InvalidData(format!(
                "task {id} appears twice in one update"
            )));
        }
    }
    Ok(())
}
